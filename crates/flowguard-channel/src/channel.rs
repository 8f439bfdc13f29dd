use std::future::Future;

use tokio::sync::mpsc;

/// The inbound side of a signal channel.
pub trait ReceiveChannel {
    type Item;

    /// Take the next buffered item without waiting.
    ///
    /// Returns `None` when nothing is buffered right now, which includes a
    /// closed channel.
    fn try_receive(&mut self) -> Option<Self::Item>;

    /// Wait for the next item.
    ///
    /// Resolves to `None` once the channel is closed and empty.
    fn receive(&mut self) -> impl Future<Output = Option<Self::Item>> + Send;
}

impl<T: Send> ReceiveChannel for mpsc::Receiver<T> {
    type Item = T;

    fn try_receive(&mut self) -> Option<T> {
        self.try_recv().ok()
    }

    fn receive(&mut self) -> impl Future<Output = Option<T>> + Send {
        self.recv()
    }
}

impl<T: Send> ReceiveChannel for mpsc::UnboundedReceiver<T> {
    type Item = T;

    fn try_receive(&mut self) -> Option<T> {
        self.try_recv().ok()
    }

    fn receive(&mut self) -> impl Future<Output = Option<T>> + Send {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_receive_on_empty_channel_returns_none() {
        let (_tx, mut rx) = mpsc::channel::<u8>(4);
        assert_eq!(rx.try_receive(), None);
    }

    #[test]
    fn try_receive_on_closed_channel_returns_none() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        drop(tx);
        assert_eq!(rx.try_receive(), None);
    }

    #[tokio::test]
    async fn receive_yields_items_in_send_order() -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("first").await?;
        tx.send("second").await?;
        drop(tx);

        assert_eq!(rx.receive().await, Some("first"));
        assert_eq!(rx.try_receive(), Some("second"));
        assert_eq!(rx.receive().await, None);
        Ok(())
    }
}
