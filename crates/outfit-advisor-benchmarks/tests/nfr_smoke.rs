//! Benchmark smoke test for advice parsing and request fingerprinting.

use std::sync::Arc;
use std::time::Instant;

use outfit_advisor_advice_contract::render_advice;
use outfit_advisor_api::{ApiClient, ApiError, ApiRequest, HttpRequest, HttpResponse, HttpTransport};
use outfit_advisor_core::ImageUpload;

struct NoopTransport;

impl HttpTransport for NoopTransport {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        Err(ApiError::Network("offline".to_string()))
    }
}

fn long_advice() -> String {
    let mut text = String::from("# Outfit Rating: 81/100\n\n## Quick Take\nSolid base.\n\n## Highlights\n");
    for index in 0..200 {
        text.push_str(&format!("Detail {index} works with the silhouette.\n"));
    }
    text.push_str("\n## Color Analysis\nEarth tones.\n\n## Suggestions\n");
    for index in 0..50 {
        text.push_str(&format!("* Suggestion {index}\n"));
    }
    text
}

#[test]
fn benchmark_parse_and_fingerprint_smoke_prints_latency() {
    let advice = long_advice();
    let client = ApiClient::new("http://127.0.0.1:8000", Arc::new(NoopTransport))
        .expect("loopback client");
    let upload = ImageUpload::new("bench.jpg", "image/jpeg", vec![7_u8; 512 * 1024])
        .expect("upload should be valid");
    let request = ApiRequest::Analyze(upload);

    let start = Instant::now();
    let mut suggestion_total = 0usize;
    let mut fingerprint_total = 0usize;

    for _ in 0..100 {
        suggestion_total += render_advice(Some(&advice)).suggestions.len();
        fingerprint_total += client.build_request(&request, None).fingerprint().len();
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_parse_fingerprint_elapsed_ms={elapsed_ms}");
    println!("benchmark_suggestion_total={suggestion_total}");

    assert_eq!(suggestion_total, 100 * 50);
    assert_eq!(fingerprint_total, 100 * 64);
    assert!(
        elapsed_ms < 5_000,
        "parse and fingerprint smoke benchmark should stay bounded"
    );
}
