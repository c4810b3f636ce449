//! Diagnostic event stream.
//!
//! A host that wants structured diagnostics beyond log lines hands an
//! [`EventSender`] to the [`FoundationBuilder`](crate::FoundationBuilder) and
//! consumes the matching [`EventStream`]. Delivery is best effort: the
//! foundation never waits on a slow consumer.

use std::pin::Pin;

use futures_core::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::correlation::CorrelationId;
use crate::error::ErrorCode;
use crate::metrics::PercentileSnapshot;
use crate::plugin::PluginKind;

/// Type alias for a boxed async stream of events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Diagnostics emitted by a foundation instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FoundationEvent {
    /// One plugin initialization attempt finished
    PluginInitialized {
        correlation_id: CorrelationId,
        plugin: PluginKind,
        active: bool,
        error_code: Option<ErrorCode>,
        elapsed_ms: f64,
    },
    /// A completion call finished, successfully or not
    CompletionRecorded {
        correlation_id: CorrelationId,
        elapsed_ms: f64,
        success: bool,
    },
    /// Percentile summary of all calls so far
    PerformanceSummary {
        correlation_id: CorrelationId,
        snapshot: PercentileSnapshot,
    },
}

impl FoundationEvent {
    /// Get the correlation id of the emitting instance.
    pub fn correlation_id(&self) -> CorrelationId {
        match self {
            FoundationEvent::PluginInitialized { correlation_id, .. }
            | FoundationEvent::CompletionRecorded { correlation_id, .. }
            | FoundationEvent::PerformanceSummary { correlation_id, .. } => *correlation_id,
        }
    }
}

/// Sending half of an event stream.
#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> EventSender<T> {
    /// Create a new event sender from an mpsc sender.
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }

    /// Try to send an event without waiting.
    ///
    /// Returns `Err(event)` if the channel is full or closed.
    pub fn try_send(&self, event: T) -> Result<(), T> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(v) => v,
            mpsc::error::TrySendError::Closed(v) => v,
        })
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Builder for event channels.
///
/// # Example
///
/// ```rust
/// use completion_foundation::{FoundationEvent, StreamBuilder};
///
/// let (sender, stream) = StreamBuilder::<FoundationEvent>::new()
///     .buffer_size(256)
///     .build();
/// # drop((sender, stream));
/// ```
pub struct StreamBuilder<T> {
    buffer_size: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Send + 'static> StreamBuilder<T> {
    /// Create a builder with a buffer of 100 events.
    pub fn new() -> Self {
        Self {
            buffer_size: 100,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the channel capacity. Events beyond it are dropped, not queued.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Build the sender and stream.
    pub fn build(self) -> (EventSender<T>, EventStream<T>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let sender = EventSender::new(tx);
        let stream: EventStream<T> = Box::pin(ReceiverStream::new(rx));
        (sender, stream)
    }
}

impl<T: Send + 'static> Default for StreamBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an event channel with the default buffer size.
pub fn create_stream<T: Send + 'static>() -> (EventSender<T>, EventStream<T>) {
    StreamBuilder::<T>::new().build()
}
