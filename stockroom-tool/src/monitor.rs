//! Connectivity monitor: polls the remote and reports transitions.

use std::future::Future;
use std::time::Duration;

use stockroom_core::Connectivity;
use stockroom_http::HttpRemote;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Something that can tell whether the remote is reachable right now.
pub trait Probe: Send + Sync + 'static {
    fn reachable(&self) -> impl Future<Output = bool> + Send;
}

impl Probe for HttpRemote {
    async fn reachable(&self) -> bool {
        self.ping().await
    }
}

/// Spawns a task probing every `interval` and sending each change of
/// connectivity. The first probe result is always sent.
///
/// The task stops when the receiver is dropped.
pub fn spawn<P: Probe>(probe: P, interval: Duration) -> mpsc::Receiver<Connectivity> {
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = None;

        loop {
            ticker.tick().await;
            let now = if probe.reachable().await {
                Connectivity::Online
            } else {
                Connectivity::Offline
            };

            if last == Some(now) {
                continue;
            }
            last = Some(now);
            debug!(%now, "connectivity probe changed");

            if tx.send(now).await.is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed sequence of probe results, then repeats the last one.
    struct Scripted(Mutex<Vec<bool>>);

    impl Scripted {
        fn new(mut script: Vec<bool>) -> Self {
            script.reverse();
            Self(Mutex::new(script))
        }
    }

    impl Probe for Scripted {
        async fn reachable(&self) -> bool {
            let mut script = self.0.lock().unwrap();
            if script.len() > 1 {
                script.pop().unwrap()
            } else {
                script[0]
            }
        }
    }

    #[tokio::test]
    async fn reports_only_transitions() {
        let probe = Scripted::new(vec![false, false, true, true, true, false, false]);
        let mut rx = spawn(probe, Duration::from_millis(1));

        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(rx.recv().await.unwrap());
        }

        assert_eq!(
            events,
            vec![
                Connectivity::Offline,
                Connectivity::Online,
                Connectivity::Offline
            ]
        );
    }

    #[tokio::test]
    async fn first_probe_is_always_reported() {
        let mut rx = spawn(Scripted::new(vec![true]), Duration::from_millis(1));

        assert_eq!(rx.recv().await, Some(Connectivity::Online));
    }
}
