use std::time::Duration;

use flowguard_scope::{Cancelled, Scope};
use tracing::debug;

use crate::channel::ReceiveChannel;

/// How a [`receive_with_timeout`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ReceiveOutcome<T> {
    /// An item arrived before the deadline.
    Received(T),
    /// The deadline elapsed with nothing received.
    TimedOut,
    /// The enclosing scope was cancelled with nothing received.
    Cancelled,
}

impl<T> ReceiveOutcome<T> {
    #[must_use]
    pub fn has_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub fn is_received(&self) -> bool {
        matches!(self, Self::Received(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Received(value) => Some(value),
            Self::TimedOut | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Received(value) => Some(value),
            Self::TimedOut | Self::Cancelled => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Received(_) => "received",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Wait for the next item on `channel`, giving up after `timeout` or when
/// `scope` is cancelled.
///
/// The deadline runs on a child of `scope` that is released on return. When
/// several conditions are ready at once, an available item always wins over
/// the deadline and over cancellation. A closed channel never yields an item,
/// so the call then resolves through the deadline or cancellation alone.
pub async fn receive_with_timeout<C>(
    scope: &Scope,
    channel: &mut C,
    timeout: Duration,
) -> ReceiveOutcome<C::Item>
where
    C: ReceiveChannel,
{
    let timer_scope = scope.child().cancel_on_drop();
    let timer = timer_scope.scope().timer(timeout);
    tokio::pin!(timer);

    let (raced, fired) = tokio::select! {
        biased;
        item = channel.receive() => (item, None),
        result = &mut timer => (None, Some(result)),
    };

    let outcome = match raced.or_else(|| channel.try_receive()) {
        Some(item) => ReceiveOutcome::Received(item),
        None => {
            let fired = match fired {
                Some(result) => result,
                None => (&mut timer).await,
            };
            match fired {
                Ok(()) => ReceiveOutcome::TimedOut,
                Err(Cancelled) => ReceiveOutcome::Cancelled,
            }
        }
    };

    debug!(
        scope = scope.id(),
        timeout_ms = timeout.as_millis(),
        outcome = outcome.label(),
        "receive with timeout resolved"
    );
    outcome
}

/// [`receive_with_timeout`] with the deadline and cancellation outcomes
/// collapsed: `None` means nothing was received.
pub async fn receive_or_timeout<C>(
    scope: &Scope,
    channel: &mut C,
    timeout: Duration,
) -> Option<C::Item>
where
    C: ReceiveChannel,
{
    receive_with_timeout(scope, channel, timeout)
        .await
        .into_value()
}
