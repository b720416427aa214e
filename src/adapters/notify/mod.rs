//! Failure notifications
//!
//! When a file fails and is quarantined, the orchestrator fires a
//! notification without blocking the pipeline. The [`Notifier`] trait is the
//! seam; the default [`LogNotifier`] emits a structured log event, which is
//! where an SMTP or webhook implementation would plug in.

use async_trait::async_trait;
use std::path::Path;

/// Delivery seam for pipeline failure notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifies the recipient that a file was quarantined
    async fn notify_failure(&self, recipient: Option<&str>, file: &Path, reason: &str);
}

/// Notifier that records failures as structured log events
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_failure(&self, recipient: Option<&str>, file: &Path, reason: &str) {
        tracing::warn!(
            recipient = recipient.unwrap_or("<unconfigured>"),
            file = %file.display(),
            reason,
            "Pipeline failure notification"
        );
    }
}
