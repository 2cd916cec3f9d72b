//! Structured logging capability handed to components that log with context.

use serde_json::Value;

/// Logger with a structured context object and a message.
///
/// Components receive it by reference so tests can substitute a recorder
/// or [`NoopLogger`].
pub trait StructuredLogger: Send + Sync {
    fn debug(&self, context: &Value, message: &str);

    fn error(&self, context: &Value, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl StructuredLogger for NoopLogger {
    fn debug(&self, _context: &Value, _message: &str) {}

    fn error(&self, _context: &Value, _message: &str) {}
}

/// Forwards to the global `tracing` subscriber, tagged with a component name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl StructuredLogger for TracingLogger {
    fn debug(&self, context: &Value, message: &str) {
        tracing::debug!(component = %self.component, context = %context, "{}", message);
    }

    fn error(&self, context: &Value, message: &str) {
        tracing::error!(component = %self.component, context = %context, "{}", message);
    }
}
