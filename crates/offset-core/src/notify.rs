//! User notification boundary.
//!
//! Workflow outcomes are reported through this trait instead of being
//! propagated as panics or silent log lines, mirroring a toast surface
//! in an interactive frontend.

/// Sink for user-facing outcome messages.
pub trait Notifier: Send + Sync {
	/// Reports a successful outcome.
	fn success(&self, message: &str);

	/// Reports a failure.
	fn error(&self, message: &str);
}

/// Notifier that writes outcomes to the tracing log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn success(&self, message: &str) {
		tracing::info!(outcome = "success", "{}", message);
	}

	fn error(&self, message: &str) {
		tracing::error!(outcome = "error", "{}", message);
	}
}
