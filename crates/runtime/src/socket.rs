//! Socket - typed multicast push stream with a remembered last value.
//!
//! A [`Socket`] is the unit of communication between ports: zero or more
//! subscribers, synchronous fan-out per emitted value, and a latest-value
//! cell that `latest_map`-style combinators read synchronously at the moment
//! a primary event is handled. Subscribers that join late see only future
//! values; nothing is replayed.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default broadcast capacity for a socket.
///
/// Lifecycle channels carry a handful of values over their whole life; event
/// channels (request/response) can burst, so the default leaves headroom.
pub const DEFAULT_CAPACITY: usize = 64;

/// Typed multicast push stream.
pub struct Socket<T> {
    tx: broadcast::Sender<T>,
    latest: Arc<Mutex<Option<T>>>,
}

impl<T: Clone + Send + 'static> Socket<T> {
    /// Creates a socket with the given broadcast capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Emits a value to all current subscribers.
    ///
    /// The latest-value cell is updated first, so a combinator woken by this
    /// emission (or by a later one on another socket) always observes it.
    /// Emitting with no subscribers is not an error.
    pub fn emit(&self, value: T) {
        *self.latest.lock() = Some(value.clone());
        let _ = self.tx.send(value);
    }

    /// Subscribes to future emissions.
    pub fn subscribe(&self) -> SocketRx<T> {
        SocketRx {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns a snapshot of the most recently emitted value, if any.
    pub fn latest(&self) -> Option<T> {
        self.latest.lock().clone()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Default for Socket<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> Clone for Socket<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            latest: Arc::clone(&self.latest),
        }
    }
}

impl<T> std::fmt::Debug for Socket<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

/// Receiving half of a [`Socket`] subscription.
///
/// Handles broadcast lag by logging and continuing, so a slow subscriber
/// never breaks a wiring loop.
pub struct SocketRx<T> {
    rx: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> SocketRx<T> {
    /// Receives the next value, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(dropped = n, "socket subscriber lagged, dropped values");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receives a value if one is immediately available.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(dropped = n, "socket subscriber lagged, dropped values");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_all_subscribers() {
        let socket: Socket<u32> = Socket::default();
        let mut a = socket.subscribe();
        let mut b = socket.subscribe();

        socket.emit(7);

        assert_eq!(a.recv().await, Some(7));
        assert_eq!(b.recv().await, Some(7));
    }

    #[tokio::test]
    async fn latest_cell_updates_without_subscribers() {
        let socket: Socket<&'static str> = Socket::default();
        assert_eq!(socket.latest(), None);

        socket.emit("first");
        socket.emit("second");

        assert_eq!(socket.latest(), Some("second"));
    }

    #[tokio::test]
    async fn late_subscriber_sees_nothing_prior() {
        let socket: Socket<u32> = Socket::default();
        socket.emit(1);

        let mut late = socket.subscribe();
        assert_eq!(late.try_recv(), None);

        socket.emit(2);
        assert_eq!(late.recv().await, Some(2));
    }

    #[tokio::test]
    async fn recv_returns_none_when_senders_dropped() {
        let socket: Socket<u32> = Socket::default();
        let mut rx = socket.subscribe();

        socket.emit(1);
        drop(socket);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn clones_share_one_stream() {
        let socket: Socket<u32> = Socket::default();
        let twin = socket.clone();
        let mut rx = twin.subscribe();

        socket.emit(5);

        assert_eq!(rx.recv().await, Some(5));
        assert_eq!(twin.latest(), Some(5));
    }
}
