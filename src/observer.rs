//! Diagnostic observers for transaction traceability.
//!
//! This module provides hooks for observing transaction lifecycles and the
//! calls made through them, for structured logging, performance monitoring
//! and debugging. The core never logs on its own; register an observer on
//! the [`Application`](crate::Application) to get output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::context::TransactionId;
use crate::error::DiError;

/// Observer trait for transaction events.
///
/// Observers are called synchronously on the thread driving the
/// transaction. Keep implementations lightweight; queue expensive work.
///
/// # Examples
///
/// ```
/// use modular_di::{Application, DiError, TransactionId, TransactionObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct TracingObserver {
///     trace_id: String,
/// }
///
/// impl TransactionObserver for TracingObserver {
///     fn calling(&self, id: TransactionId, function: &str) {
///         println!("[{}] [{}] Calling: {}", self.trace_id, id, function);
///     }
///
///     fn called(
///         &self,
///         id: TransactionId,
///         function: &str,
///         elapsed: Duration,
///         error: Option<&DiError>,
///     ) {
///         match error {
///             None => {
///                 println!("[{}] [{}] Called: {} in {:?}", self.trace_id, id, function, elapsed)
///             }
///             Some(e) => println!("[{}] [{}] FAILED {}: {}", self.trace_id, id, function, e),
///         }
///     }
/// }
///
/// let mut app = Application::default();
/// app.add_observer(Arc::new(TracingObserver { trace_id: "req-123".to_string() }));
/// ```
pub trait TransactionObserver: Send + Sync {
    /// Called when a transaction context is entered, before its enter hooks.
    fn entered(&self, id: TransactionId) {
        let _ = id;
    }

    /// Called once the exit hooks ran, or when entry was aborted.
    ///
    /// `error` is the guarded block's error, else the first hook error.
    fn exited(&self, id: TransactionId, elapsed: Duration, error: Option<&DiError>) {
        let _ = (id, elapsed, error);
    }

    /// Called before a function call enters the middleware chain.
    fn calling(&self, id: TransactionId, function: &str);

    /// Called after the middleware chain returned.
    fn called(&self, id: TransactionId, function: &str, elapsed: Duration, error: Option<&DiError>);
}

/// Container for registered observers.
///
/// Designed to cost nothing beyond an empty-Vec check when no observers
/// are registered.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn TransactionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn TransactionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn entered(&self, id: TransactionId) {
        for observer in &self.observers {
            observer.entered(id);
        }
    }

    #[inline]
    pub(crate) fn exited(&self, id: TransactionId, elapsed: Duration, error: Option<&DiError>) {
        for observer in &self.observers {
            observer.exited(id, elapsed, error);
        }
    }

    #[inline]
    pub(crate) fn calling(&self, id: TransactionId, function: &str) {
        for observer in &self.observers {
            observer.calling(id, function);
        }
    }

    #[inline]
    pub(crate) fn called(
        &self,
        id: TransactionId,
        function: &str,
        elapsed: Duration,
        error: Option<&DiError>,
    ) {
        for observer in &self.observers {
            observer.called(id, function, elapsed, error);
        }
    }
}

/// Built-in observer that logs events to stdout, failures to stderr.
///
/// Useful for development and debugging. For production, implement an
/// observer that feeds your logging/tracing infrastructure.
///
/// # Examples
///
/// ```
/// use modular_di::{Application, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut app = Application::default();
/// app.add_observer(Arc::new(LoggingObserver::new()));
///
/// // Every transaction and call is now logged
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[modular-di]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionObserver for LoggingObserver {
    fn entered(&self, id: TransactionId) {
        println!("{} [{}] Entered transaction", self.prefix, id);
    }

    fn exited(&self, id: TransactionId, elapsed: Duration, error: Option<&DiError>) {
        match error {
            None => println!("{} [{}] Exited transaction after {:?}", self.prefix, id, elapsed),
            Some(error) => eprintln!(
                "{} [{}] Exited transaction after {:?} with error: {}",
                self.prefix, id, elapsed, error
            ),
        }
    }

    fn calling(&self, id: TransactionId, function: &str) {
        println!("{} [{}] Calling: {}", self.prefix, id, function);
    }

    fn called(
        &self,
        id: TransactionId,
        function: &str,
        elapsed: Duration,
        error: Option<&DiError>,
    ) {
        match error {
            None => println!("{} [{}] Called: {} in {:?}", self.prefix, id, function, elapsed),
            Some(error) => eprintln!(
                "{} [{}] FAILED {} after {:?}: {}",
                self.prefix, id, function, elapsed, error
            ),
        }
    }
}

/// Performance-focused observer that counts transactions and calls.
pub struct MetricsObserver {
    pub transaction_count: AtomicU64,
    pub failed_transaction_count: AtomicU64,
    pub call_count: AtomicU64,
    pub failed_call_count: AtomicU64,
    pub total_call_time: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            transaction_count: AtomicU64::new(0),
            failed_transaction_count: AtomicU64::new(0),
            call_count: AtomicU64::new(0),
            failed_call_count: AtomicU64::new(0),
            total_call_time: AtomicU64::new(0),
        }
    }

    /// Transactions that completed their exit.
    pub fn transaction_count(&self) -> u64 {
        self.transaction_count.load(Ordering::Relaxed)
    }

    pub fn failed_transaction_count(&self) -> u64 {
        self.failed_transaction_count.load(Ordering::Relaxed)
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn failed_call_count(&self) -> u64 {
        self.failed_call_count.load(Ordering::Relaxed)
    }

    pub fn total_call_time(&self) -> Duration {
        Duration::from_nanos(self.total_call_time.load(Ordering::Relaxed))
    }

    /// Average call time, or None before the first call.
    pub fn average_call_time(&self) -> Option<Duration> {
        let count = self.call_count();
        if count == 0 {
            return None;
        }
        Some(Duration::from_nanos(
            self.total_call_time.load(Ordering::Relaxed) / count,
        ))
    }

    /// Resets all metrics.
    pub fn reset(&self) {
        self.transaction_count.store(0, Ordering::Relaxed);
        self.failed_transaction_count.store(0, Ordering::Relaxed);
        self.call_count.store(0, Ordering::Relaxed);
        self.failed_call_count.store(0, Ordering::Relaxed);
        self.total_call_time.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionObserver for MetricsObserver {
    fn exited(&self, _id: TransactionId, _elapsed: Duration, error: Option<&DiError>) {
        self.transaction_count.fetch_add(1, Ordering::Relaxed);
        if error.is_some() {
            self.failed_transaction_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn calling(&self, _id: TransactionId, _function: &str) {
        // Counted on completion
    }

    fn called(
        &self,
        _id: TransactionId,
        _function: &str,
        elapsed: Duration,
        error: Option<&DiError>,
    ) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.total_call_time
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        if error.is_some() {
            self.failed_call_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}
