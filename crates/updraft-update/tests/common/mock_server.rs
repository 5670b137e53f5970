//! Mock server helpers for feed and artifact endpoints

use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `release` from the latest-release endpoint
pub async fn mock_latest_release(server: &MockServer, release: Value) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Answer the latest-release endpoint with `status`
pub async fn mock_latest_release_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve a body that is not release JSON from the latest-release endpoint
pub async fn mock_malformed_release(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(server)
        .await;
}

/// Serve `content` at `/download/{name}`
pub async fn mock_artifact(server: &MockServer, name: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Serve `content` at `/download/{name}` after holding the response for `delay`
pub async fn mock_artifact_delayed(
    server: &MockServer,
    name: &str,
    content: &[u8],
    delay: Duration,
) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Redirect `/redirect/{name}` to `/download/{name}`
pub async fn mock_artifact_redirect(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/redirect/{}", name)))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/download/{}", server.uri(), name)),
        )
        .mount(server)
        .await;
}

/// Answer `/download/{name}` with `status`
pub async fn mock_artifact_status(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Download URL of an artifact served by [`mock_artifact`]
pub fn artifact_url(server: &MockServer, name: &str) -> String {
    format!("{}/download/{}", server.uri(), name)
}
