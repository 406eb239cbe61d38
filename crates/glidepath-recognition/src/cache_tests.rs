use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::*;
use tokio::sync::Notify;

/// Scripted recognizer that counts calls.
struct Scripted {
    calls: AtomicU32,
    answer: Result<RecognitionResponse, RecognitionError>,
    gate: Option<Arc<Notify>>,
}

impl Scripted {
    fn new(answer: Result<RecognitionResponse, RecognitionError>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            answer,
            gate: None,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for Scripted {
    async fn recognize(
        &self,
        _request: &RecognitionRequest,
        _page_url: &str,
    ) -> Result<RecognitionResponse, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answer.clone()
    }
}

fn accepted(distance: f64) -> RecognitionResponse {
    RecognitionResponse {
        valid: true,
        data: Some(crate::protocol::RecognitionData::Number(distance)),
        description: None,
        show_time: None,
    }
}

fn request() -> RecognitionRequest {
    RecognitionRequest::puzzle("BIG", "SMALL", 320, 60)
}

#[tokio::test]
async fn test_success_is_replayed() {
    let cached = CachedRecognizer::new(Scripted::new(Ok(accepted(90.0))), None);

    let first = cached.recognize(&request(), "u").await.unwrap();
    let second = cached.recognize(&request(), "u").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(cached.inner().calls(), 1);
}

#[tokio::test]
async fn test_rejection_is_cached() {
    let rejected = Err(RecognitionError::Rejected {
        description: Some("bad image".into()),
    });
    let cached = CachedRecognizer::new(Scripted::new(rejected), None);

    for _ in 0..3 {
        let err = cached.recognize(&request(), "u").await.unwrap_err();
        assert!(matches!(err, RecognitionError::Rejected { .. }));
    }
    assert_eq!(cached.inner().calls(), 1);
}

#[tokio::test]
async fn test_transport_failure_allows_retry() {
    let failing = Err(RecognitionError::Network("reset".into()));
    let cached = CachedRecognizer::new(Scripted::new(failing), None);

    assert!(cached.recognize(&request(), "u").await.is_err());
    assert!(cached.recognize(&request(), "u").await.is_err());
    assert_eq!(cached.inner().calls(), 2);
}

#[tokio::test]
async fn test_distinct_requests_are_independent() {
    let cached = CachedRecognizer::new(Scripted::new(Ok(accepted(10.0))), None);

    cached.recognize(&request(), "u").await.unwrap();
    cached
        .recognize(&RecognitionRequest::behavior(300, 1), "u")
        .await
        .unwrap();
    assert_eq!(cached.inner().calls(), 2);
}

#[tokio::test]
async fn test_concurrent_duplicate_is_in_flight() {
    let gate = Arc::new(Notify::new());
    let mut scripted = Scripted::new(Ok(accepted(42.0)));
    scripted.gate = Some(gate.clone());
    let cached = Arc::new(CachedRecognizer::new(scripted, None));

    let first = {
        let cached = cached.clone();
        tokio::spawn(async move { cached.recognize(&request(), "u").await })
    };
    while cached.inner().calls() == 0 {
        tokio::task::yield_now().await;
    }

    let err = cached.recognize(&request(), "u").await.unwrap_err();
    assert!(matches!(err, RecognitionError::InFlight));

    gate.notify_one();
    let response = first.await.unwrap().unwrap();
    assert_eq!(response.distance(), 42.0);
    assert_eq!(cached.inner().calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_callers_reach_service_once() {
    let cached = Arc::new(CachedRecognizer::new(Scripted::new(Ok(accepted(42.0))), None));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let cached = cached.clone();
            tokio::spawn(async move { cached.recognize(&request(), "u").await })
        })
        .collect();

    for task in tasks {
        match task.await.unwrap() {
            Ok(response) => assert_eq!(response.distance(), 42.0),
            Err(e) => assert!(matches!(e, RecognitionError::InFlight)),
        }
    }
    assert_eq!(cached.inner().calls(), 1);

    // Settled result is replayed, never re-requested.
    cached.recognize(&request(), "u").await.unwrap();
    assert_eq!(cached.inner().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_result_ttl_expires() {
    let cached = CachedRecognizer::new(
        Scripted::new(Ok(accepted(5.0))),
        Some(Duration::from_secs(60)),
    );

    cached.recognize(&request(), "u").await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    cached.recognize(&request(), "u").await.unwrap();
    assert_eq!(cached.inner().calls(), 2);
}

#[test]
fn test_key_is_stable() {
    let a = CachedRecognizer::<Scripted>::key(&request()).unwrap();
    let b = CachedRecognizer::<Scripted>::key(&request()).unwrap();
    assert_eq!(a, b);
}
