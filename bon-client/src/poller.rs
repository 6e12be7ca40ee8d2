//! 轮询任务
//!
//! 每个活动视图一个可取消的定时任务：启动时立即执行一次，之后按固定间隔
//! 执行；`wake()` 触发一次立即执行；`stop()` 或丢弃句柄时取消。

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Handle to a running poll loop
pub struct Poller {
    name: &'static str,
    shutdown: CancellationToken,
    wake: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

/// Cloneable trigger for an immediate poll
#[derive(Debug, Clone)]
pub struct PollWaker(Arc<Notify>);

impl PollWaker {
    pub fn wake(&self) {
        self.0.notify_one();
    }
}

impl Poller {
    /// Spawn a poll loop on the current tokio runtime
    ///
    /// An in-flight run is abandoned as soon as the poller is stopped.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let wake = Arc::new(Notify::new());

        let token = shutdown.clone();
        let notify = wake.clone();
        let run = async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = notify.notified() => {
                        ticker.reset();
                    }
                }

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = task() => {}
                }
            }
        };

        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(()) => tracing::debug!(poller = %name, "Poller stopped"),
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(poller = %name, panic = %panic_msg, "Poller panicked");
                }
            }
        });
        tracing::debug!(poller = %name, interval_ms = interval.as_millis() as u64, "Poller started");

        Self {
            name,
            shutdown,
            wake,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the task now instead of waiting for the next tick
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    pub fn waker(&self) -> PollWaker {
        PollWaker(self.wake.clone())
    }

    /// Cancel the loop (idempotent)
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(poller = %self.name, error = %e, "Poller task join failed");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("name", &self.name)
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}
