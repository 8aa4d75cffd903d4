//! Integration tests for the advisory client and session flow
//!
//! The Ollama endpoint is replaced by a one-shot HTTP responder on a local
//! port, so these run without a model server.

use async_trait::async_trait;
use icurisk::advisory::{Advisor, AdvisoryClient};
use icurisk::scoring::{Scorer, ScoringArtifacts};
use icurisk::types::{FeatureRecord, Gender, RiskLabel, FEATURE_NAMES};
use icurisk::{RiskError, RiskEvaluator, Session, SessionState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

const MODEL: &str = "qwen2.5:7b-instruct";

/// Serve a single request with a canned response; the handle yields the request body
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request_body = read_request_body(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request_body
    });

    (url, handle)
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf[header_end..]).into_owned()
}

fn client_for(url: &str) -> AdvisoryClient {
    AdvisoryClient::with_config(url, MODEL, Duration::from_secs(5)).unwrap()
}

/// Port that nothing listens on
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

struct FixedScorer {
    probability: f64,
    names: Vec<String>,
}

impl Scorer for FixedScorer {
    fn predict_proba(&self, _row: &[f64]) -> icurisk::Result<f64> {
        Ok(self.probability)
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }
}

fn evaluator(probability: f64, threshold: f64) -> RiskEvaluator {
    let scorer = FixedScorer {
        probability,
        names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
    };
    let artifacts = ScoringArtifacts::from_parts(Box::new(scorer), threshold).unwrap();
    RiskEvaluator::new(Arc::new(artifacts))
}

/// Advisor that always fails, counting attempts
struct FailingAdvisor {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Advisor for FailingAdvisor {
    async fn ask(&self, _prompt: &str) -> icurisk::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RiskError::Advisory("connection refused".to_string()))
    }
}

struct EchoAdvisor;

#[async_trait]
impl Advisor for EchoAdvisor {
    async fn ask(&self, prompt: &str) -> icurisk::Result<String> {
        Ok(format!("echo: {}", prompt.len()))
    }
}

fn patient() -> FeatureRecord {
    FeatureRecord::new(Gender::Female, 45.0, 1.5, 6.0).unwrap()
}

#[tokio::test]
async fn test_generate_returns_response_field() {
    let (url, server) =
        serve_once("200 OK", r#"{"model":"qwen2.5:7b-instruct","response":"Low risk means...","done":true}"#)
            .await;

    let reply = assert_ok!(client_for(&url).generate("What does this mean?").await);
    assert_eq!(reply, "Low risk means...");

    let body: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"model": MODEL, "prompt": "What does this mean?", "stream": false})
    );
}

#[tokio::test]
async fn test_non_success_status_is_advisory_error() {
    let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

    let err = assert_err!(client_for(&url).generate("hi").await);
    assert!(matches!(err, RiskError::Advisory(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_invalid_json_is_advisory_error() {
    let (url, _server) = serve_once("200 OK", "not json at all").await;

    let err = assert_err!(client_for(&url).generate("hi").await);
    assert!(matches!(err, RiskError::Advisory(_)));
}

#[tokio::test]
async fn test_missing_response_field_is_advisory_error() {
    let (url, _server) = serve_once("200 OK", r#"{"done":true}"#).await;

    let err = assert_err!(client_for(&url).generate("hi").await);
    assert!(err.to_string().contains("response"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_advisory_error() {
    let url = closed_port_url().await;
    let client = client_for(&url);

    let err = assert_err!(client.generate("hi").await);
    assert!(matches!(err, RiskError::Advisory(_)));
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let client = AdvisoryClient::with_config(&url, MODEL, Duration::from_millis(200)).unwrap();
    let err = assert_err!(client.generate("hi").await);
    assert!(matches!(err, RiskError::Advisory(_)));
}

#[tokio::test]
async fn test_list_models() {
    let (url, _server) = serve_once(
        "200 OK",
        r#"{"models":[{"name":"qwen2.5:7b-instruct","size":1},{"name":"llama3.1:8b","size":2}]}"#,
    )
    .await;

    let models = assert_ok!(client_for(&url).list_models().await);
    assert_eq!(models, vec!["qwen2.5:7b-instruct", "llama3.1:8b"]);
}

#[tokio::test]
async fn test_session_advises_against_mock_server() {
    let (url, server) = serve_once("200 OK", r#"{"response":"Low risk means..."}"#).await;
    let mut session = Session::new(evaluator(0.10, 0.40), Box::new(client_for(&url)));

    let assessment = assert_ok!(session.submit(patient()));
    assert_eq!(assessment.label, RiskLabel::Low);

    let prompt = session.prefilled_prompt("What does this mean?").unwrap();
    let reply = assert_ok!(session.ask(&prompt).await);
    assert_eq!(reply, "Low risk means...");

    match session.state() {
        SessionState::Advised {
            assessment: held,
            reply,
            ..
        } => {
            assert_eq!(*held, assessment);
            assert_eq!(reply, "Low risk means...");
        }
        other => panic!("expected Advised, got {:?}", other),
    }

    let body = server.await.unwrap();
    assert!(body.contains("Low risk patient"));
}

#[tokio::test]
async fn test_session_forwards_prompt_verbatim() {
    let (url, server) = serve_once("200 OK", r#"{"response":"Low risk means..."}"#).await;
    let mut session = Session::new(evaluator(0.10, 0.40), Box::new(client_for(&url)));

    session.submit(patient()).unwrap();
    let reply = assert_ok!(session.ask("explain").await);
    assert_eq!(reply, "Low risk means...");

    let body: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(body["prompt"], "explain");
    assert_eq!(body["model"], MODEL);
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn test_unreachable_endpoint_keeps_assessment() {
    let url = closed_port_url().await;
    let mut session = Session::new(evaluator(0.50, 0.40), Box::new(client_for(&url)));

    let assessment = session.submit(patient()).unwrap();
    assert_eq!(assessment.label, RiskLabel::High);

    let prompt = session.prefilled_prompt("What does this mean?").unwrap();
    let err = assert_err!(session.ask(&prompt).await);
    assert!(matches!(err, RiskError::Advisory(_)));
    assert!(!err.is_fatal());

    assert!(matches!(session.state(), SessionState::Evaluated { .. }));
    assert_eq!(session.state().assessment(), Some(&assessment));
}

#[tokio::test]
async fn test_advisory_failure_keeps_assessment() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = FailingAdvisor {
        calls: calls.clone(),
    };
    let mut session = Session::new(evaluator(0.42, 0.40), Box::new(advisor));

    let assessment = session.submit(patient()).unwrap();
    let prompt = session.prefilled_prompt("").unwrap();

    let err = assert_err!(session.ask(&prompt).await);
    assert!(matches!(err, RiskError::Advisory(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(matches!(session.state(), SessionState::Evaluated { .. }));
    assert_eq!(session.state().assessment(), Some(&assessment));
}

#[tokio::test]
async fn test_ask_without_assessment_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = FailingAdvisor {
        calls: calls.clone(),
    };
    let mut session = Session::new(evaluator(0.42, 0.40), Box::new(advisor));

    let err = assert_err!(session.ask("anything").await);
    assert!(matches!(err, RiskError::InvalidTransition { .. }));
    assert!(session.prefilled_prompt("q").is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(session.state(), SessionState::Idle));
}

#[tokio::test]
async fn test_new_evaluation_replaces_advised_state() {
    let mut session = Session::new(evaluator(0.42, 0.40), Box::new(EchoAdvisor));

    session.submit(patient()).unwrap();
    let prompt = session.prefilled_prompt("why").unwrap();
    session.ask(&prompt).await.unwrap();
    assert!(matches!(session.state(), SessionState::Advised { .. }));

    let next = FeatureRecord::new(Gender::Male, 60.0, 3.0, 8.0).unwrap();
    session.submit(next).unwrap();
    assert!(matches!(session.state(), SessionState::Evaluated { .. }));
    assert_eq!(session.state().record(), Some(&next));
    assert!(session.state().reply().is_none());
}
