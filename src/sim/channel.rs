//! In-Process Trace Channel.
//!
//! Lets a producer running on another thread drive the access loop without
//! touching the filesystem. At most one record is pending at any time and
//! [`Producer::submit`] blocks until the latency for that record comes back,
//! so requests and responses strictly alternate in FIFO order.

use crate::common::SimError;
use crate::sim::trace::{LatencySink, TraceEvent, TraceRecord, TraceSource};
use log::warn;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};

/// Creates a connected producer, source and sink.
pub fn handoff() -> (Producer, ChannelSource, ChannelSink) {
    let (request_tx, request_rx) = mpsc::sync_channel(1);
    let (reply_tx, reply_rx) = mpsc::channel();

    (
        Producer {
            requests: request_tx,
            replies: reply_rx,
        },
        ChannelSource {
            requests: request_rx,
        },
        ChannelSink { replies: reply_tx },
    )
}

/// Producer end of the channel.
pub struct Producer {
    requests: SyncSender<TraceEvent>,
    replies: Receiver<u64>,
}

impl Producer {
    /// Sends `record` and waits for its total latency.
    pub fn submit(&self, record: TraceRecord) -> Result<u64, SimError> {
        self.requests
            .send(TraceEvent::Access(record))
            .map_err(|_| SimError::Disconnected)?;
        self.replies.recv().map_err(|_| SimError::Disconnected)
    }

    /// Sends the halt sentinel. The producer cannot be used afterwards.
    pub fn halt(self) -> Result<(), SimError> {
        self.requests
            .send(TraceEvent::Halt)
            .map_err(|_| SimError::Disconnected)
    }
}

/// Consumer end delivering trace events.
pub struct ChannelSource {
    requests: Receiver<TraceEvent>,
}

impl TraceSource for ChannelSource {
    /// A producer dropped without halting is treated as a halt.
    fn next_event(&mut self) -> Result<TraceEvent, SimError> {
        match self.requests.recv() {
            Ok(event) => Ok(event),
            Err(_) => {
                warn!("trace producer disconnected without HALT");
                Ok(TraceEvent::Halt)
            }
        }
    }
}

/// Consumer end returning latencies.
pub struct ChannelSink {
    replies: Sender<u64>,
}

impl LatencySink for ChannelSink {
    fn emit(&mut self, total: u64) -> Result<(), SimError> {
        self.replies.send(total).map_err(|_| SimError::Disconnected)
    }
}
