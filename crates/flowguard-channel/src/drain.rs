use tracing::debug;

use crate::channel::ReceiveChannel;

/// Discard every item currently buffered in `channel`, returning how many
/// were discarded.
///
/// Never waits. Items a concurrent producer sends while the drain runs may or
/// may not be included; the count is not a snapshot of the channel.
pub fn drain<C: ReceiveChannel>(channel: &mut C) -> usize {
    drain_with(channel, drop)
}

/// Like [`drain`], but hands each drained item to `f` in receive order.
pub fn drain_with<C, F>(channel: &mut C, mut f: F) -> usize
where
    C: ReceiveChannel,
    F: FnMut(C::Item),
{
    let mut total = 0;
    while let Some(item) = channel.try_receive() {
        f(item);
        total += 1;
    }
    debug!(drained = total, "drained buffered channel items");
    total
}
