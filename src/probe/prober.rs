//! Single reachability probe.
//!
//! # Responsibilities
//! - Run one GET against the configured target under a hard deadline
//! - Classify the result against the expected status set
//! - Log and count failures, then fold them into `false`

use std::sync::Arc;
use std::time::Instant;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::probe::error::ProbeError;
use crate::probe::transport::HttpProbe;

/// Runs probes for one immutable [`ProbeConfig`].
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn HttpProbe>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(transport: Arc<dyn HttpProbe>, config: ProbeConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run one probe and report whether the target was reachable.
    ///
    /// Never fails. `shutdown` is the engine's root token; each call derives
    /// its own child token, so cancelling one probe leaves others untouched.
    pub async fn probe(&self, shutdown: &CancellationToken) -> bool {
        let probe_id = Uuid::new_v4();
        let span = tracing::debug_span!("probe", %probe_id, url = %self.config.url);

        async {
            let start = Instant::now();
            let result = self.check(shutdown).await;
            let elapsed = start.elapsed();

            match result {
                Ok(()) => {
                    tracing::trace!(elapsed_ms = elapsed.as_millis() as u64, "Probe succeeded");
                    metrics::record_probe("reachable", elapsed);
                    true
                }
                Err(ProbeError::Cancelled) => {
                    tracing::debug!("Probe cancelled by shutdown");
                    metrics::record_probe(ProbeError::Cancelled.outcome(), elapsed);
                    false
                }
                Err(e) => {
                    tracing::warn!(error = %e, causes = ?e.causes(), "Probe failed");
                    metrics::record_probe(e.outcome(), elapsed);
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run one probe, keeping the failure reason.
    pub async fn check(&self, shutdown: &CancellationToken) -> Result<(), ProbeError> {
        let token = shutdown.child_token();
        let fetch = self.transport.fetch_status(&self.config.url);

        // Dropping `fetch` on either early branch aborts the request.
        let status = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ProbeError::Cancelled),
            res = time::timeout(self.config.timeout, fetch) => match res {
                Ok(status) => status?,
                Err(_) => {
                    token.cancel();
                    return Err(ProbeError::Timeout(self.config.timeout));
                }
            },
        };

        if self.config.is_expected(status) {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedStatus(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    /// Answers with a fixed status after a fixed delay.
    struct FixedProbe {
        status: Result<u16, &'static str>,
        delay: Duration,
        dropped_early: Arc<AtomicUsize>,
    }

    struct DropFlag {
        flag: Arc<AtomicUsize>,
        armed: bool,
    }

    impl Drop for DropFlag {
        fn drop(&mut self) {
            if self.armed {
                self.flag.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl HttpProbe for FixedProbe {
        async fn fetch_status(&self, _url: &Url) -> Result<u16, ProbeError> {
            let mut guard = DropFlag {
                flag: self.dropped_early.clone(),
                armed: true,
            };
            time::sleep(self.delay).await;
            guard.armed = false;
            self.status.map_err(|e| ProbeError::Transport(e.into()))
        }
    }

    fn prober(status: Result<u16, &'static str>, delay_ms: u64, timeout_ms: u64) -> (Prober, Arc<AtomicUsize>) {
        let dropped_early = Arc::new(AtomicUsize::new(0));
        let transport = Arc::new(FixedProbe {
            status,
            delay: Duration::from_millis(delay_ms),
            dropped_early: dropped_early.clone(),
        });
        let config = ProbeConfig {
            url: Url::parse("http://probe.test/generate_204").unwrap(),
            timeout: Duration::from_millis(timeout_ms),
            expected_status_codes: BTreeSet::from([204]),
        };
        (Prober::new(transport, config), dropped_early)
    }

    #[tokio::test(start_paused = true)]
    async fn test_expected_status_is_reachable() {
        let (prober, _) = prober(Ok(204), 10, 3000);
        assert!(prober.probe(&CancellationToken::new()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_status_is_unreachable() {
        let (prober, _) = prober(Ok(200), 10, 3000);
        let token = CancellationToken::new();
        assert!(matches!(
            prober.check(&token).await,
            Err(ProbeError::UnexpectedStatus(200))
        ));
        assert!(!prober.probe(&token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_unreachable() {
        let (prober, _) = prober(Err("connection refused"), 0, 3000);
        let token = CancellationToken::new();
        assert!(matches!(prober.check(&token).await, Err(ProbeError::Transport(_))));
        assert!(!prober.probe(&token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_at_deadline() {
        let (prober, dropped_early) = prober(Ok(204), 500, 50);
        let start = time::Instant::now();

        let result = prober.check(&CancellationToken::new()).await;

        assert!(matches!(result, Err(ProbeError::Timeout(d)) if d == Duration::from_millis(50)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(60));
        // The in-flight request future was dropped, not left running.
        assert_eq!(dropped_early.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_probe() {
        let (prober, dropped_early) = prober(Ok(204), 500, 1000);
        let shutdown = CancellationToken::new();

        let canceller = shutdown.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert!(matches!(prober.check(&shutdown).await, Err(ProbeError::Cancelled)));
        assert_eq!(dropped_early.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_cancel_siblings() {
        let (slow, _) = prober(Ok(204), 500, 50);
        let (fast, _) = prober(Ok(204), 100, 1000);
        let shutdown = CancellationToken::new();

        let (slow_ok, fast_ok) = tokio::join!(slow.probe(&shutdown), fast.probe(&shutdown));
        assert!(!slow_ok);
        assert!(fast_ok);
        assert!(!shutdown.is_cancelled());
    }
}
