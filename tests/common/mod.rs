#![allow(dead_code)]

use std::path::PathBuf;

use openai_client::{OpenAIAuthentication, OpenAIClient, OpenAIClientSettings};
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

pub const TEST_KEY: &str = "sk-test-key";

pub fn client_for(server: &MockServer) -> OpenAIClient {
    let auth = OpenAIAuthentication::new(TEST_KEY)
        .unwrap()
        .with_organization("org-test")
        .unwrap();
    let settings = OpenAIClientSettings::new().with_domain(server.uri());
    OpenAIClient::new(auth, settings).unwrap()
}

pub fn error_body(error_type: &str, message: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": null,
            "code": code
        }
    })
}

/// A temp dir holding `image.png` and `mask.png`.
pub fn image_files() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("image.png");
    let mask = dir.path().join("mask.png");
    std::fs::write(&image, b"fake-png-image-bytes").unwrap();
    std::fs::write(&mask, b"fake-png-mask-bytes").unwrap();
    (dir, image, mask)
}
