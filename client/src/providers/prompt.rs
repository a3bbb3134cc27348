//! Terminal [`Confirmation`].

use crate::providers::Confirmation;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// Asks on stdout and takes the answer from the shell's input loop.
///
/// The shell owns stdin, so the prompt does not read it directly: the input
/// loop offers every line to [`PromptConfirmation::answer`] first, and only
/// treats it as a command when no question is open.
#[derive(Debug, Clone, Default)]
pub struct PromptConfirmation {
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl PromptConfirmation {
    /// New prompt with no open question.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the open question with `line`.
    ///
    /// Returns `false` if no question was open, in which case the line is
    /// not consumed.
    pub fn answer(&self, line: &str) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match pending {
            Some(sender) => {
                let yes = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                let _ = sender.send(yes);
                true
            },
            None => false,
        }
    }

    /// True while a question waits for an answer.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Confirmation for PromptConfirmation {
    fn confirm(&self, question: &str) -> impl Future<Output = bool> + Send {
        let (sender, receiver) = oneshot::channel();
        // a newer question replaces an unanswered one, which then reads as "no"
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(sender);
        println!("{question} [y/N]");

        async move { receiver.await.unwrap_or(false) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answer_resolves_question() {
        let prompt = PromptConfirmation::new();
        assert!(!prompt.answer("y"));

        let question = prompt.confirm("Cancel?");
        assert!(prompt.is_waiting());
        assert!(prompt.answer(" Yes "));
        assert!(question.await);
        assert!(!prompt.is_waiting());
    }

    #[tokio::test]
    async fn test_anything_else_is_no() {
        let prompt = PromptConfirmation::new();
        let question = prompt.confirm("Cancel?");
        assert!(prompt.answer(""));
        assert!(!question.await);
    }

    #[tokio::test]
    async fn test_replaced_question_reads_as_no() {
        let prompt = PromptConfirmation::new();
        let first = prompt.confirm("First?");
        let second = prompt.confirm("Second?");
        assert!(!first.await);
        assert!(prompt.answer("y"));
        assert!(second.await);
    }
}
