use konv_core::ChannelId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A message addressed to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub channel_id: ChannelId,
    pub message: String,
}

impl MessageEvent {
    pub fn new(channel_id: impl Into<ChannelId>, message: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message: message.into(),
        }
    }
}

/// Broadcast relay between message producers and the delivery worker.
///
/// Built once by the composition root and cloned into every producer.
/// Subscribers that fall more than `capacity` events behind lose the oldest
/// ones and are told so through `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct DispatchBus {
    sender: broadcast::Sender<MessageEvent>,
}

impl DispatchBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event and return immediately.
    ///
    /// Returns the number of subscribers that will see it. Publishing with
    /// nobody subscribed drops the event and returns zero.
    pub fn publish(&self, event: MessageEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(channel_id = %event.channel_id, "No delivery worker subscribed, event dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DispatchBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscriber_is_noop() {
        let bus = DispatchBus::new(8);
        assert_eq!(bus.publish(MessageEvent::new("c1", "hello")), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_publish_order() {
        let bus = DispatchBus::new(8);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(MessageEvent::new("c1", "first")), 1);
        bus.publish(MessageEvent::new("c2", "second"));

        assert_eq!(rx.recv().await.unwrap(), MessageEvent::new("c1", "first"));
        assert_eq!(rx.recv().await.unwrap(), MessageEvent::new("c2", "second"));
    }

    #[tokio::test]
    async fn test_clones_share_one_channel() {
        let bus = DispatchBus::new(8);
        let producer = bus.clone();
        let mut rx = bus.subscribe();

        producer.publish(MessageEvent::new("c1", "hello"));
        assert_eq!(rx.recv().await.unwrap().message, "hello");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = DispatchBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(MessageEvent::new("c1", "x")), 1);
    }
}
