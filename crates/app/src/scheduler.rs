//! Notification scheduler that records the armed digest and logs it.

use std::convert::Infallible;
use std::sync::Mutex;

use chrono::NaiveDateTime;

use freshguard_digest::NotificationScheduler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDigest {
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
}

/// Stand-in for a platform notification center: one pending digest at most.
#[derive(Debug, Default)]
pub struct LoggingScheduler {
    pending: Mutex<Option<PendingDigest>>,
}

impl LoggingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PendingDigest> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl NotificationScheduler for LoggingScheduler {
    type Error = Infallible;

    fn arm(&self, fire_at: NaiveDateTime, title: &str, body: &str) -> Result<(), Infallible> {
        tracing::info!(%fire_at, title, body, "digest notification scheduled");
        *self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(PendingDigest {
            fire_at,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn cancel(&self) -> Result<(), Infallible> {
        let previous = self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take();
        if previous.is_some() {
            tracing::info!("digest notification cancelled");
        }
        Ok(())
    }
}
