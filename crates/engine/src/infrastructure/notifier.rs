//! Notifier that routes user notices into the log.

use crate::infrastructure::ports::{Notice, NoticeLevel, Notifier};

/// Logs notices; used when no UI is attached.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(notice = %notice.message, "Notice"),
            NoticeLevel::Warning => tracing::warn!(notice = %notice.message, "Notice"),
            NoticeLevel::Error => tracing::error!(notice = %notice.message, "Notice"),
        }
    }
}
