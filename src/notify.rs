//! Fatal-error notification.

/// Receives the diagnostic message when a run aborts.
///
/// Called synchronously on the worker thread before the run returns, so an
/// implementation may block until the user acknowledges the message.
pub trait Notifier {
    fn fatal(&mut self, message: &str);
}

impl<F> Notifier for F
where
    F: FnMut(&str),
{
    fn fatal(&mut self, message: &str) {
        self(message);
    }
}

/// Default notifier: emits an error event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn fatal(&mut self, message: &str) {
        trace_error!(error = message, "optimization aborted");
    }
}
