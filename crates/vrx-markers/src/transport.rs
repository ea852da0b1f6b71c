//! Outbound channels for marker requests

use std::io::Write;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

use crate::msgs::{Marker, MARKER_TOPIC};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("No subscribers on topic {topic}")]
    NoSubscribers { topic: String },
    #[error("No marker ids left to assign in namespace {ns}")]
    IdsExhausted { ns: String },
    #[error("Failed to serialize marker: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sink that hands marker requests to the simulator.
///
/// `publish` returns once the marker has been handed to the transport. It
/// does not wait for the simulator to render it and never retries.
pub trait MarkerPublisher {
    fn publish(&mut self, marker: &Marker) -> Result<(), PublishError>;
}

impl<P: MarkerPublisher + ?Sized> MarkerPublisher for Box<P> {
    fn publish(&mut self, marker: &Marker) -> Result<(), PublishError> {
        (**self).publish(marker)
    }
}

/// In-process `/marker` topic backed by a broadcast channel.
///
/// A send succeeds once any receiver exists. Receivers that fall more than
/// `capacity` markers behind lose the oldest ones, so size the channel for
/// the burst a subscriber has to absorb.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Marker>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to markers published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Marker> {
        self.tx.subscribe()
    }
}

impl MarkerPublisher for BroadcastPublisher {
    fn publish(&mut self, marker: &Marker) -> Result<(), PublishError> {
        match self.tx.send(marker.clone()) {
            Ok(receivers) => {
                trace!(topic = MARKER_TOPIC, id = marker.id, receivers, "Published marker");
                Ok(())
            }
            Err(_) => Err(PublishError::NoSubscribers {
                topic: MARKER_TOPIC.to_string(),
            }),
        }
    }
}

/// Writes each marker as a single JSON line
pub struct JsonLinesPublisher<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MarkerPublisher for JsonLinesPublisher<W> {
    fn publish(&mut self, marker: &Marker) -> Result<(), PublishError> {
        let line = serde_json::to_string(marker)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}
