//! Scripted confirmation gate.

use crate::providers::Confirmation;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

/// Answers every question the same way and remembers what was asked.
#[derive(Debug, Clone)]
pub struct FixedConfirmation {
    answer: bool,
    questions: Arc<Mutex<Vec<String>>>,
}

impl FixedConfirmation {
    /// Always says yes.
    #[must_use]
    pub fn accept() -> Self {
        Self::answering(true)
    }

    /// Always says no.
    #[must_use]
    pub fn decline() -> Self {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Self {
        Self {
            answer,
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Questions asked so far.
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Confirmation for FixedConfirmation {
    fn confirm(&self, question: &str) -> impl Future<Output = bool> + Send {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(question.to_string());
        let answer = self.answer;
        async move { answer }
    }
}
