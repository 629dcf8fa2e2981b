use crate::base::neterror::NetError;
use crate::http::transport::{HttpRequest, HttpResponse, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Used when no positive timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Internal state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Dispatch,
    Race,
    Done,
}

/// One execution of a built request against a [`Transport`].
///
/// The transport call runs on its own task and reports through a one-slot
/// channel. The caller only waits on the first of: the cancellation handle,
/// the timeout, or that channel. A losing transport task is never joined;
/// whatever it produces later is dropped.
pub struct HttpTransaction {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    cancel: CancellationToken,
    state: State,
}

impl HttpTransaction {
    pub fn new(
        transport: Arc<dyn Transport>,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Self {
        let timeout = timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            transport,
            timeout,
            cancel: cancel.unwrap_or_default(),
            state: State::Init,
        }
    }

    /// Effective timeout for this execution.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancel_handle(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run the request. On every failure the cancellation handle is
    /// triggered so the background task can give up.
    pub async fn start(&mut self, request: HttpRequest) -> Result<HttpResponse, NetError> {
        self.state = State::Dispatch;
        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            timeout = ?self.timeout,
            "dispatching request"
        );

        let (tx, rx) = oneshot::channel();
        let transport = self.transport.clone();
        let abandon = self.cancel.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                r = transport.send(request) => r,
                _ = abandon.cancelled() => Err(NetError::Cancelled),
            };
            if tx.send(result).is_err() {
                tracing::warn!("transport finished after the request was abandoned");
            }
        });

        self.state = State::Race;
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(NetError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => Err(NetError::RequestTimeout(self.timeout)),
            done = rx => done.unwrap_or_else(|_| {
                Err(NetError::Transport("transport task ended without a result".into()))
            }),
        };
        self.state = State::Done;

        if let Err(ref e) = outcome {
            tracing::debug!(error = %e, state = ?self.state, "request failed");
            self.cancel.cancel();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::requestbody::RequestBody;
    use crate::http::responsebody::ResponseBody;
    use crate::http::transport::Sending;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Never answers.
    struct Hang;

    impl Transport for Hang {
        fn send(&self, _request: HttpRequest) -> Sending {
            Box::pin(futures::future::pending())
        }
    }

    /// Answers after `delay` with an empty 204.
    struct Delayed {
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    impl Transport for Delayed {
        fn send(&self, _request: HttpRequest) -> Sending {
            let delay = self.delay;
            let finished = self.finished.clone();
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                finished.store(true, Ordering::SeqCst);
                Ok(http::Response::builder()
                    .status(204)
                    .body(ResponseBody::empty())
                    .unwrap())
            })
        }
    }

    struct Refused;

    impl Transport for Refused {
        fn send(&self, _request: HttpRequest) -> Sending {
            Box::pin(async { Err(NetError::Transport("connection refused".into())) })
        }
    }

    fn request() -> HttpRequest {
        http::Request::builder()
            .uri("http://example.test/")
            .body(RequestBody::Empty)
            .unwrap()
    }

    #[test]
    fn test_timeout_defaults() {
        let t = HttpTransaction::new(Arc::new(Hang), None, None);
        assert_eq!(t.timeout(), DEFAULT_TIMEOUT);

        let t = HttpTransaction::new(Arc::new(Hang), Some(Duration::ZERO), None);
        assert_eq!(t.timeout(), Duration::from_secs(5));

        let t = HttpTransaction::new(Arc::new(Hang), Some(Duration::from_millis(250)), None);
        assert_eq!(t.timeout(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_wins_over_hanging_transport() {
        let timeout = Duration::from_millis(50);
        let mut t = HttpTransaction::new(Arc::new(Hang), Some(timeout), None);

        let started = tokio::time::Instant::now();
        let err = t.start(request()).await.unwrap_err();

        assert_eq!(err, NetError::RequestTimeout(timeout));
        assert!(started.elapsed() < timeout + Duration::from_millis(5));
        assert!(t.cancel_handle().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_wins_before_timeout() {
        let finished = Arc::new(AtomicBool::new(false));
        let transport = Delayed {
            delay: Duration::from_millis(10),
            finished: finished.clone(),
        };
        let mut t = HttpTransaction::new(Arc::new(transport), Some(Duration::from_secs(1)), None);

        let response = t.start(request()).await.unwrap();
        assert_eq!(response.status(), 204);
        assert!(finished.load(Ordering::SeqCst));
        assert!(!t.cancel_handle().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancellation() {
        let parent = CancellationToken::new();
        let mut t = HttpTransaction::new(Arc::new(Hang), None, Some(parent.child_token()));

        let trigger = parent.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        assert_eq!(t.start(request()).await.unwrap_err(), NetError::Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let finished = Arc::new(AtomicBool::new(false));
        let transport = Delayed {
            delay: Duration::ZERO,
            finished,
        };
        let mut t = HttpTransaction::new(Arc::new(transport), None, Some(cancel));
        assert_eq!(t.start(request()).await.unwrap_err(), NetError::Cancelled);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_and_cancels() {
        let mut t = HttpTransaction::new(Arc::new(Refused), None, None);
        let err = t.start(request()).await.unwrap_err();
        assert_eq!(err, NetError::Transport("connection refused".into()));
        assert!(t.cancel_handle().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_task_result_discarded() {
        let finished = Arc::new(AtomicBool::new(false));
        let transport = Delayed {
            delay: Duration::from_secs(10),
            finished: finished.clone(),
        };
        let mut t = HttpTransaction::new(
            Arc::new(transport),
            Some(Duration::from_millis(100)),
            None,
        );

        assert!(t.start(request()).await.unwrap_err().is_timeout());
        // The background task observed the cancellation and gave up.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
