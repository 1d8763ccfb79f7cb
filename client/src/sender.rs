use std::future::Future;

use anyhow::Result;
use deduce_protocol::{Choice, ClientMessage};
use tokio::sync::mpsc;

/// Where the handler's choices go
pub trait ChoiceSender: Send {
    fn send(&mut self, choice: Choice, rqid: Option<u64>) -> impl Future<Output = Result<()>> + Send;
}

/// Cloneable sender that writes `/choose` commands for one battle room
/// into an outgoing wire-format channel.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    room_id: String,
    outgoing: mpsc::Sender<String>,
}

impl ChannelSender {
    pub fn new(room_id: impl Into<String>, outgoing: mpsc::Sender<String>) -> Self {
        Self {
            room_id: room_id.into(),
            outgoing,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }
}

impl ChoiceSender for ChannelSender {
    async fn send(&mut self, choice: Choice, rqid: Option<u64>) -> Result<()> {
        let message = ClientMessage::choose(self.room_id.clone(), choice, rqid);
        self.outgoing
            .send(message.to_wire_format())
            .await
            .map_err(|_| anyhow::anyhow!("Connection closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sender_wire_format() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut sender = ChannelSender::new("battle-gen4randombattle-1", tx);
        sender.send(Choice::Switch(2), Some(5)).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            "battle-gen4randombattle-1|/choose switch 2|5"
        );
    }

    #[tokio::test]
    async fn test_closed_channel_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut sender = ChannelSender::new("battle-1", tx);
        assert!(sender.send(Choice::Move(1), None).await.is_err());
    }
}
