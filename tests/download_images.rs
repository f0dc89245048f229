mod common;

use common::{completed_body, test_client};
use monsterapi::StatusResponse;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_download_all_images() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/first.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("first image"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/second.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("second image"))
        .expect(1)
        .mount(&server)
        .await;

    let first = format!("{}/images/first.png", server.uri());
    let second = format!("{}/images/second.png", server.uri());
    let body = completed_body("abc123", &[first.as_str(), second.as_str()]);
    let done = StatusResponse::from_body(body.to_string()).unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let files = test_client(&server)
        .download_all_images(&done, temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0], temp_dir.path().join("0_first.png"));
    assert_eq!(files[1], temp_dir.path().join("1_second.png"));
    assert_eq!(std::fs::read(&files[0]).unwrap(), b"first image");
    assert_eq!(std::fs::read(&files[1]).unwrap(), b"second image");
}

#[tokio::test]
async fn test_download_does_not_send_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/first.png"))
        .and(header_exists("x-api-key"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/first.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("image"))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("{}/images/first.png", server.uri());
    let file = test_client(&server)
        .download_image(&url, temp_dir.path())
        .await
        .unwrap();

    assert_eq!(std::fs::read(file).unwrap(), b"image");
}

#[tokio::test]
async fn test_download_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("{}/images/missing.png", server.uri());
    let result = test_client(&server).download_image(&url, temp_dir.path()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_download_all_keeps_outputs_with_same_file_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a/0.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("from a"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b/0.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("from b"))
        .expect(1)
        .mount(&server)
        .await;

    let first = format!("{}/a/0.png", server.uri());
    let second = format!("{}/b/0.png", server.uri());
    let body = completed_body("abc123", &[first.as_str(), second.as_str()]);
    let done = StatusResponse::from_body(body.to_string()).unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let files = test_client(&server)
        .download_all_images(&done, temp_dir.path())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_ne!(files[0], files[1]);
    assert_eq!(std::fs::read(&files[0]).unwrap(), b"from a");
    assert_eq!(std::fs::read(&files[1]).unwrap(), b"from b");
}
