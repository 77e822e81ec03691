//! Processor combinators - the wiring vocabulary between sockets.
//!
//! Each combinator connects an input socket to an output socket with one
//! transformation and registers the resulting task on a [`Circuit`]. The
//! input is subscribed *before* the task is spawned, so values emitted
//! immediately after wiring are never missed.
//!
//! `merge_map` and `latest_merge_map` are the only combinators that run
//! caller-supplied async work; everything else is synchronous relay. An
//! `Err` from async work is terminal for the whole circuit.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::socket::Socket;

/// Forwards every value on `src` unchanged to `dst`.
pub fn direct<T>(circuit: &mut Circuit, src: &Socket<T>, dst: &Socket<T>)
where
    T: Clone + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("direct", async move {
        while let Some(value) = rx.recv().await {
            dst.emit(value);
        }
        Ok(())
    });
}

/// Emits `f(value)` on `dst` for every value on `src`.
///
/// With a closure ignoring its input this is the constant remap of the
/// original wiring vocabulary; occurrence is preserved, payload replaced.
pub fn map_to<T, U, F>(circuit: &mut Circuit, src: &Socket<T>, dst: &Socket<U>, f: F)
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("map_to", async move {
        while let Some(value) = rx.recv().await {
            dst.emit(f(value));
        }
        Ok(())
    });
}

/// Remaps values on `src`, dropping those for which `f` returns `None`.
pub fn filter_map<T, U, F>(circuit: &mut Circuit, src: &Socket<T>, dst: &Socket<U>, f: F)
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    F: Fn(T) -> Option<U> + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("filter_map", async move {
        while let Some(value) = rx.recv().await {
            if let Some(mapped) = f(value) {
                dst.emit(mapped);
            }
        }
        Ok(())
    });
}

/// Invokes `f` independently for each value on `src` and emits each result
/// on `dst` as it resolves.
///
/// Multiple invocations may be in flight at once; result order equals
/// completion order, not arrival order. In-flight invocations are never
/// cancelled by later values. An `Err` from any invocation terminates the
/// circuit.
pub fn merge_map<T, U, F, Fut>(circuit: &mut Circuit, src: &Socket<T>, dst: &Socket<U>, f: F)
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("merge_map", async move {
        let mut inflight: JoinSet<Result<U>> = JoinSet::new();
        let mut open = true;
        while open || !inflight.is_empty() {
            tokio::select! {
                value = rx.recv(), if open => match value {
                    Some(value) => {
                        inflight.spawn(f(value));
                    }
                    None => open = false,
                },
                Some(done) = inflight.join_next(), if !inflight.is_empty() => match done {
                    Ok(Ok(output)) => dst.emit(output),
                    Ok(Err(error)) => return Err(error),
                    Err(join_error) => return Err(Error::Wiring(join_error.to_string())),
                },
            }
        }
        Ok(())
    });
}

/// Synchronous snapshot of the latest values of a tuple of auxiliary
/// sockets.
///
/// Implemented for the arities the port wirings use. A snapshot is `None`
/// until *every* auxiliary socket has emitted at least once; combinators
/// reading an incomplete snapshot simply do not fire - there is no default
/// substitution and no buffering of the primary value.
pub trait LatestSnapshot: Send + 'static {
    type Values: Send + 'static;

    fn snapshot(&self) -> Option<Self::Values>;
}

impl<A> LatestSnapshot for (Socket<A>,)
where
    A: Clone + Send + 'static,
{
    type Values = (A,);

    fn snapshot(&self) -> Option<(A,)> {
        self.0.latest().map(|a| (a,))
    }
}

impl<A, B> LatestSnapshot for (Socket<A>, Socket<B>)
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    type Values = (A, B);

    fn snapshot(&self) -> Option<(A, B)> {
        Some((self.0.latest()?, self.1.latest()?))
    }
}

/// On each `src` value, combines it with the latest values of `aux` and
/// emits `f(value, snapshot)` on `dst`.
///
/// Skips the value entirely if any auxiliary socket has not yet emitted.
pub fn latest_map<T, L, U, F>(
    circuit: &mut Circuit,
    src: &Socket<T>,
    aux: L,
    dst: &Socket<U>,
    f: F,
) where
    T: Clone + Send + 'static,
    L: LatestSnapshot,
    U: Clone + Send + 'static,
    F: Fn(T, L::Values) -> U + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("latest_map", async move {
        while let Some(value) = rx.recv().await {
            match aux.snapshot() {
                Some(values) => dst.emit(f(value, values)),
                None => {
                    tracing::debug!("latest_map skipped, auxiliary socket has not emitted yet");
                }
            }
        }
        Ok(())
    });
}

/// Async form of [`latest_map`]: the snapshot is taken synchronously when
/// the `src` value is handled, then `f` runs with [`merge_map`] semantics
/// (independent, unordered, uncancelled).
pub fn latest_merge_map<T, L, U, F, Fut>(
    circuit: &mut Circuit,
    src: &Socket<T>,
    aux: L,
    dst: &Socket<U>,
    f: F,
) where
    T: Clone + Send + 'static,
    L: LatestSnapshot,
    U: Clone + Send + 'static,
    F: Fn(T, L::Values) -> Fut + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    circuit.wire("latest_merge_map", async move {
        let mut inflight: JoinSet<Result<U>> = JoinSet::new();
        let mut open = true;
        while open || !inflight.is_empty() {
            tokio::select! {
                value = rx.recv(), if open => match value {
                    Some(value) => match aux.snapshot() {
                        Some(values) => {
                            inflight.spawn(f(value, values));
                        }
                        None => {
                            tracing::debug!(
                                "latest_merge_map skipped, auxiliary socket has not emitted yet"
                            );
                        }
                    },
                    None => open = false,
                },
                Some(done) = inflight.join_next(), if !inflight.is_empty() => match done {
                    Ok(Ok(output)) => dst.emit(output),
                    Ok(Err(error)) => return Err(error),
                    Err(join_error) => return Err(Error::Wiring(join_error.to_string())),
                },
            }
        }
        Ok(())
    });
}

/// Bridges a native event emitter into a socket.
///
/// For each handle emitted on `src`, obtains a native receiver via
/// `subscribe` and forwards every occurrence mapped through `select`
/// (dropping `None`) for as long as the emitter lives. Handles emitted later
/// get their own bridge; earlier bridges keep running.
pub fn from_event<H, N, E, S, F>(
    circuit: &mut Circuit,
    src: &Socket<H>,
    dst: &Socket<E>,
    subscribe: S,
    select: F,
) where
    H: Clone + Send + 'static,
    N: Clone + Send + 'static,
    E: Clone + Send + 'static,
    S: Fn(&H) -> broadcast::Receiver<N> + Send + 'static,
    F: Fn(N) -> Option<E> + Send + Sync + 'static,
{
    let mut rx = src.subscribe();
    let dst = dst.clone();
    let select = Arc::new(select);
    circuit.wire("from_event", async move {
        let mut bridges: JoinSet<()> = JoinSet::new();
        loop {
            tokio::select! {
                handle = rx.recv() => match handle {
                    Some(handle) => {
                        let mut native = subscribe(&handle);
                        let dst = dst.clone();
                        let select = Arc::clone(&select);
                        bridges.spawn(async move {
                            loop {
                                match native.recv().await {
                                    Ok(event) => {
                                        if let Some(mapped) = select(event) {
                                            dst.emit(mapped);
                                        }
                                    }
                                    Err(broadcast::error::RecvError::Lagged(n)) => {
                                        tracing::warn!(dropped = n, "native event bridge lagged");
                                    }
                                    Err(broadcast::error::RecvError::Closed) => break,
                                }
                            }
                        });
                    }
                    None => break,
                },
                Some(_) = bridges.join_next(), if !bridges.is_empty() => {}
            }
        }
        // src is closed; keep forwarding for already-bridged emitters.
        while bridges.join_next().await.is_some() {}
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn direct_forwards_in_order() {
        let src: Socket<u32> = Socket::default();
        let dst: Socket<u32> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        direct(&mut circuit, &src, &dst);
        let _driver = tokio::spawn(circuit.run());

        src.emit(1);
        src.emit(2);
        src.emit(3);

        assert_eq!(out.recv().await, Some(1));
        assert_eq!(out.recv().await, Some(2));
        assert_eq!(out.recv().await, Some(3));
    }

    #[tokio::test]
    async fn map_to_replaces_payload_preserving_occurrence() {
        let src: Socket<u32> = Socket::default();
        let dst: Socket<&'static str> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        map_to(&mut circuit, &src, &dst, |_| "tick");
        let _driver = tokio::spawn(circuit.run());

        src.emit(10);
        src.emit(20);

        assert_eq!(out.recv().await, Some("tick"));
        assert_eq!(out.recv().await, Some("tick"));
    }

    #[tokio::test]
    async fn filter_map_drops_none() {
        let src: Socket<u32> = Socket::default();
        let dst: Socket<u32> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        filter_map(&mut circuit, &src, &dst, |v| (v % 2 == 0).then_some(v));
        let _driver = tokio::spawn(circuit.run());

        src.emit(1);
        src.emit(2);
        src.emit(3);
        src.emit(4);

        assert_eq!(out.recv().await, Some(2));
        assert_eq!(out.recv().await, Some(4));
    }

    #[tokio::test]
    async fn merge_map_emits_in_completion_order() {
        let src: Socket<(&'static str, u64)> = Socket::default();
        let dst: Socket<&'static str> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        merge_map(&mut circuit, &src, &dst, |(name, delay_ms)| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(name)
        });
        let _driver = tokio::spawn(circuit.run());

        src.emit(("slow", 50));
        src.emit(("fast", 5));

        assert_eq!(out.recv().await, Some("fast"));
        assert_eq!(out.recv().await, Some("slow"));
    }

    #[tokio::test]
    async fn merge_map_error_terminates_circuit() {
        let src: Socket<u32> = Socket::default();
        let dst: Socket<u32> = Socket::default();

        let mut circuit = Circuit::new();
        merge_map(&mut circuit, &src, &dst, |_| async {
            Err(Error::Launch("injected".into()))
        });
        let driver = tokio::spawn(circuit.run());

        src.emit(1);

        let error = driver.await.unwrap().unwrap_err();
        assert!(matches!(error, Error::Launch(_)));
    }

    #[tokio::test]
    async fn latest_map_does_not_fire_before_aux_emits() {
        let src: Socket<u32> = Socket::default();
        let aux: Socket<&'static str> = Socket::default();
        let dst: Socket<String> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        latest_map(&mut circuit, &src, (aux.clone(),), &dst, |v, (label,)| {
            format!("{label}:{v}")
        });
        let _driver = tokio::spawn(circuit.run());

        // Aux cell is empty: this occurrence is dropped, not buffered.
        src.emit(1);
        tokio::task::yield_now().await;
        assert_eq!(out.try_recv(), None);

        aux.emit("a");
        src.emit(2);
        assert_eq!(out.recv().await, Some("a:2".to_string()));

        aux.emit("b");
        src.emit(3);
        assert_eq!(out.recv().await, Some("b:3".to_string()));
    }

    #[tokio::test]
    async fn latest_merge_map_combines_with_two_aux_sockets() {
        let src: Socket<u32> = Socket::default();
        let aux_a: Socket<&'static str> = Socket::default();
        let aux_b: Socket<u32> = Socket::default();
        let dst: Socket<String> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        latest_merge_map(
            &mut circuit,
            &src,
            (aux_a.clone(), aux_b.clone()),
            &dst,
            |v, (a, b)| async move { Ok(format!("{a}/{b}/{v}")) },
        );
        let _driver = tokio::spawn(circuit.run());

        aux_a.emit("x");
        src.emit(1);
        tokio::task::yield_now().await;
        assert_eq!(out.try_recv(), None, "second aux never emitted");

        aux_b.emit(9);
        src.emit(2);
        assert_eq!(out.recv().await, Some("x/9/2".to_string()));
    }

    #[derive(Clone)]
    struct FakeEmitter {
        tx: broadcast::Sender<u32>,
    }

    #[tokio::test]
    async fn from_event_forwards_for_emitter_lifetime() {
        let (tx, _) = broadcast::channel(8);
        let emitter = FakeEmitter { tx: tx.clone() };

        let src: Socket<FakeEmitter> = Socket::default();
        let dst: Socket<u32> = Socket::default();
        let mut out = dst.subscribe();

        let mut circuit = Circuit::new();
        from_event(
            &mut circuit,
            &src,
            &dst,
            |e: &FakeEmitter| e.tx.subscribe(),
            |n| (n > 10).then_some(n),
        );
        let _driver = tokio::spawn(circuit.run());

        src.emit(emitter);
        tokio::task::yield_now().await;

        tx.send(5).unwrap();
        tx.send(11).unwrap();
        tx.send(42).unwrap();

        assert_eq!(out.recv().await, Some(11));
        assert_eq!(out.recv().await, Some(42));
    }
}
