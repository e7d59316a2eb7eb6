//! Channel Event Sink
//!
//! Queues flow events on an unbounded channel so a UI task can drain them
//! at its own pace.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::ports::{FlowEvent, FlowEventSink};

pub struct ChannelEventSink {
    sender: UnboundedSender<FlowEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Self, UnboundedReceiver<FlowEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl FlowEventSink for ChannelEventSink {
    fn on_event(&self, event: FlowEvent) {
        // a dropped receiver only means nobody is listening anymore
        let _ = self.sender.send(event);
    }
}
