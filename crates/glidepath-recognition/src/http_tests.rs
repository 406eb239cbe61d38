use super::*;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn puzzle() -> RecognitionRequest {
    RecognitionRequest::puzzle("BIG", "SMALL", 320, 60)
}

#[test]
fn test_endpoint_trims_trailing_slash() {
    let client = HttpRecognizer::new("http://ocr.local/").unwrap();
    assert_eq!(client.endpoint(), "http://ocr.local/hello");
}

#[tokio::test]
async fn test_recognize_success() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/hello"))
        .and(matchers::header("path", "https://shop.example/login"))
        .and(matchers::body_partial_json(json!({
            "ocr_type": 4,
            "big_image": "BIG",
            "version": "6.5"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "data": 118,
            "description": "Solved",
            "showTime": 2000
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpRecognizer::new(&mock_server.uri()).unwrap();
    let response = client
        .recognize(&puzzle(), "https://shop.example/login")
        .await
        .unwrap();

    assert_eq!(response.distance(), 118.0);
    assert_eq!(response.message(), Some("Solved"));
}

#[tokio::test]
async fn test_invalid_result_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false,
            "description": "points exhausted"
        })))
        .mount(&mock_server)
        .await;

    let client = HttpRecognizer::new(&mock_server.uri()).unwrap();
    let err = client.recognize(&puzzle(), "https://a").await.unwrap_err();

    match err {
        RecognitionError::Rejected { description } => {
            assert_eq!(description.as_deref(), Some("points exhausted"));
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = HttpRecognizer::new(&mock_server.uri()).unwrap();
    let err = client.recognize(&puzzle(), "https://a").await.unwrap_err();

    match err {
        RecognitionError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = HttpRecognizer::new(&mock_server.uri()).unwrap();
    let err = client.recognize(&puzzle(), "https://a").await.unwrap_err();
    assert!(matches!(err, RecognitionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_server() {
    let client = HttpRecognizer::with_options(
        "http://127.0.0.1:1",
        Duration::from_secs(2),
        DEFAULT_CLIENT_VERSION,
    )
    .unwrap();
    let err = client.recognize(&puzzle(), "https://a").await.unwrap_err();
    assert!(matches!(err, RecognitionError::Network(_)));
}
