//! Images endpoint against a mocked OpenAI server.

mod common;

use openai_client::{
    ImageGenerationRequest, ImageOptions, ImageResponseFormat, ImageSize, OpenAIError,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, error_body, image_files};

fn images_body(urls: &[&str]) -> serde_json::Value {
    json!({
        "created": 1589478378,
        "data": urls.iter().map(|url| json!({ "url": url })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn test_generate_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("Authorization", "Bearer sk-test-key"))
        .and(header("OpenAI-Organization", "org-test"))
        .and(body_json(json!({
            "prompt": "A house riding a velociraptor",
            "n": 1,
            "size": "256x256",
            "response_format": "url"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(images_body(&["https://cdn.test/house.png"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .images()
        .generate_image("A house riding a velociraptor", 1, ImageSize::Small)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.created(), 1589478378);
    for result in &results {
        assert_eq!(result.key, "https://cdn.test/house.png");
    }
}

#[tokio::test]
async fn test_generate_image_rejects_bad_count_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .images()
        .generate_image("A house", 0, ImageSize::Small)
        .await
        .unwrap_err();

    assert!(matches!(err, OpenAIError::ArgumentError(_)));
}

#[tokio::test]
async fn test_generate_image_zero_results_is_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(images_body(&[])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .images()
        .generate_image("Nothing at all", 1, ImageSize::Small)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(results.skipped(), 0);
}

#[tokio::test]
async fn test_entries_without_payload_are_counted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1589478378,
            "data": [
                { "revised_prompt": "no payload" },
                { "url": "https://cdn.test/kept.png" },
                {}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .images()
        .generate_image("Half empty", 3, ImageSize::Small)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.skipped(), 2);
    assert_eq!(results[0].key, "https://cdn.test/kept.png");
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body(
            "invalid_request_error",
            "Incorrect API key provided",
            "invalid_api_key",
        )))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .images()
        .generate_image("A house", 1, ImageSize::Small)
        .await
        .unwrap_err();

    match err {
        OpenAIError::ApiError { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .images()
        .generate_image("A house", 1, ImageSize::Small)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_malformed_success_body_is_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"unexpected\": true}"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .images()
        .generate_image("A house", 1, ImageSize::Small)
        .await
        .unwrap_err();

    assert!(matches!(err, OpenAIError::ResponseError(_)));
}

#[tokio::test]
async fn test_create_image_edit_sends_multipart() {
    let server = MockServer::start().await;
    let (_dir, image, mask) = image_files();

    Mock::given(method("POST"))
        .and(path("/v1/images/edits"))
        .and(body_string_contains("name=\"image\"; filename=\"image.png\""))
        .and(body_string_contains("name=\"mask\"; filename=\"mask.png\""))
        .and(body_string_contains(
            "A sunlit indoor lounge area with a pool containing a flamingo",
        ))
        .and(body_string_contains("256x256"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(images_body(&[
                "https://cdn.test/edit-1.png",
                "https://cdn.test/edit-2.png",
            ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .images()
        .create_image_edit(
            &image,
            Some(mask.as_path()),
            "A sunlit indoor lounge area with a pool containing a flamingo",
            2,
            ImageSize::Small,
        )
        .await
        .unwrap();

    assert_eq!(
        results.keys().collect::<Vec<_>>(),
        vec!["https://cdn.test/edit-1.png", "https://cdn.test/edit-2.png"]
    );
}

#[tokio::test]
async fn test_create_image_edit_with_missing_file_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .images()
        .create_image_edit(
            "/definitely/not/here/image.png",
            None,
            "A flamingo",
            1,
            ImageSize::Small,
        )
        .await
        .unwrap_err();

    match err {
        OpenAIError::IoError { path, .. } => {
            assert!(path.ends_with("image.png"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_image_variation() {
    let server = MockServer::start().await;
    let (_dir, image, _mask) = image_files();

    Mock::given(method("POST"))
        .and(path("/v1/images/variations"))
        .and(body_string_contains("name=\"image\"; filename=\"image.png\""))
        .and(body_string_contains("name=\"n\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(images_body(&["https://cdn.test/var.png"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .images()
        .create_image_variation(&image, 1, ImageSize::Small)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url.as_deref(), Some("https://cdn.test/var.png"));
}

#[tokio::test]
async fn test_download_url_and_base64_images() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdn/house.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_string_contains("b64_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [
                { "url": format!("{}/cdn/house.png", server.uri()) },
                { "b64_json": "aGVsbG8=" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = ImageGenerationRequest::new(
        "A house",
        ImageOptions::new()
            .with_count(2)
            .with_response_format(ImageResponseFormat::B64Json),
    )
    .unwrap();
    let results = client.images().generate_image_with(request).await.unwrap();
    let images = client.images().download_all(&results).await.unwrap();

    assert_eq!(images, vec![b"png-bytes".to_vec(), b"hello".to_vec()]);
}
