//! In-memory session slot.

use crate::error::{ClientError, Result};
use crate::providers::SessionSlot;
use std::sync::{Arc, Mutex, PoisonError};

/// Session slot backed by memory.
///
/// Clones share the record, so a test can keep a handle and inspect what
/// the reducer wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionSlot {
    record: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl MemorySessionSlot {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that already holds `record`.
    #[must_use]
    pub fn with_record(record: &str) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record.to_string()))),
            fail_writes: false,
        }
    }

    /// Make every `store` and `clear` fail.
    #[must_use]
    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// What is stored right now.
    #[must_use]
    pub fn record(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            Err(ClientError::Storage("disk full".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SessionSlot for MemorySessionSlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.record())
    }

    fn store(&self, record: &str) -> Result<()> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
