//! Upload route.
//!
//! `POST /api/upload` accepts either a JSON envelope of base64 payloads or a
//! `multipart/form-data` body. The body is fully validated before the
//! pipeline makes any provider call.

use std::error::Error as StdError;

use axum::{
    Json, Router,
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use futures::TryStreamExt;
use http_body_util::LengthLimitError;
use linkdrop_core::ingest::{FileUploadRequest, MultipartBatch, ValidationError, normalize_mime_type};
use linkdrop_core::outcome::UploadReport;
use linkdrop_shared::AppError;
use tracing::{debug, info};

use crate::{AppState, error::ApiError};

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload).fallback(method_not_allowed))
}

/// POST `/upload`
async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<UploadReport>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(normalize_mime_type);

    let files = match content_type.as_deref() {
        Some("application/json") => read_json(&state, request.into_body()).await?,
        Some("multipart/form-data") => read_multipart(&state, request).await?,
        other => {
            return Err(AppError::validation(
                "unsupported_content_type",
                format!(
                    "expected application/json or multipart/form-data, got {}",
                    other.unwrap_or("no content type")
                ),
                None,
            )
            .into());
        }
    };

    info!(files = files.len(), "Upload batch accepted");
    let report = state.pipeline.run(files).await?;
    Ok(Json(report))
}

async fn read_json(
    state: &AppState,
    body: Body,
) -> Result<Vec<FileUploadRequest>, ValidationError> {
    let max = state.ingester.limits().request_body_limit();
    let bytes = axum::body::to_bytes(body, max)
        .await
        .map_err(|e| body_error(&e, max))?;
    state.ingester.ingest_json(&bytes)
}

async fn read_multipart(
    state: &AppState,
    request: Request,
) -> Result<Vec<FileUploadRequest>, ValidationError> {
    let max = state.ingester.limits().request_body_limit();
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ValidationError::malformed(e.body_text()))?;

    let mut batch = MultipartBatch::new(&state.ingester);
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            debug!(field = %field_name, file = %file_name, "Reading file part");
            let stream = field.map_err(|e| multipart_error(&e, max));
            batch
                .add_file_field(&file_name, content_type.as_deref(), stream)
                .await?;
        } else {
            let value = field.text().await.map_err(|e| multipart_error(&e, max))?;
            batch.add_text_field(&field_name, &value);
        }
    }

    batch.finish()
}

fn body_error(err: &axum::Error, max: usize) -> ValidationError {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return ValidationError::BodyTooLarge { max };
        }
        source = current.source();
    }
    ValidationError::malformed(format!("failed to read request body: {err}"))
}

fn multipart_error(err: &axum::extract::multipart::MultipartError, max: usize) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::BodyTooLarge { max }
    } else {
        ValidationError::malformed(err.body_text())
    }
}

async fn method_not_allowed(method: Method) -> Response {
    (
        [(header::ALLOW, "POST")],
        ApiError(AppError::MethodNotAllowed(format!(
            "{method} is not supported, use POST"
        ))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use linkdrop_core::credential::ClientCredentials;
    use linkdrop_core::ingest::{MultipartIngester, UploadLimits};
    use linkdrop_core::pipeline::UploadPipeline;
    use linkdrop_dropbox::{DropboxClient, DropboxEndpoints};
    use mockito::{Mock, Server, ServerGuard};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "linkdrop-test-boundary";

    fn app(server: &ServerGuard) -> Router {
        let transport = DropboxClient::new(
            reqwest::Client::new(),
            DropboxEndpoints::with_base(&server.url()),
        );
        let pipeline = UploadPipeline::new(
            Arc::new(transport),
            ClientCredentials::new("key", "secret", "rt"),
            None,
        );
        let ingester =
            MultipartIngester::new(UploadLimits::new().with_max_files(2).with_max_file_size(16));
        crate::create_router(AppState::new(pipeline, ingester))
    }

    /// Mocks that must never be hit.
    async fn no_provider_calls(server: &mut ServerGuard) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for path in [
            "/oauth2/token",
            "/2/files/upload",
            "/2/sharing/create_shared_link_with_settings",
        ] {
            mocks.push(server.mock("POST", path).expect(0).create_async().await);
        }
        mocks
    }

    async fn happy_provider(server: &mut ServerGuard, files: usize) -> Vec<Mock> {
        vec![
            server
                .mock("POST", "/oauth2/token")
                .with_status(200)
                .with_body(r#"{"access_token":"T"}"#)
                .expect(1)
                .create_async()
                .await,
            server
                .mock("POST", "/2/files/upload")
                .with_status(200)
                .with_body(r#"{"path_lower":"/a.jpg"}"#)
                .expect(files)
                .create_async()
                .await,
            server
                .mock("POST", "/2/sharing/create_shared_link_with_settings")
                .with_status(200)
                .with_body(r#"{"url":"https://x/a.jpg?dl=0"}"#)
                .expect(files)
                .create_async()
                .await,
        ]
    }

    async fn assert_mocks(mocks: Vec<Mock>) {
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    fn json_request(body: &Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> HttpRequest<Body> {
        let mut body = String::new();
        for (name, file, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file {
                Some((file_name, content_type)) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn file(name: &str, mime: &str, data: &str) -> Value {
        json!({ "name": name, "type": mime, "data": data })
    }

    #[tokio::test]
    async fn test_json_upload_end_to_end() {
        let mut server = Server::new_async().await;
        let mocks = happy_provider(&mut server, 1).await;

        let (status, body) = send(
            app(&server),
            json_request(&json!({ "files": [file("a.jpg", "image/jpeg", "YWJj")] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "files": [{ "name": "a.jpg", "link": "https://x/a.jpg?dl=1" }] })
        );
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_multipart_upload_end_to_end() {
        let mut server = Server::new_async().await;
        let mocks = happy_provider(&mut server, 2).await;

        let (status, body) = send(
            app(&server),
            multipart_request(&[
                ("order_id", None, "ORD-5"),
                ("file", Some(("a.jpg", "image/jpeg")), "abc"),
                ("file", Some(("b.pdf", "application/pdf")), "%PDF"),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["files"][0]["name"], "a.jpg");
        assert_eq!(body["files"][1]["name"], "b.pdf");
        assert_eq!(body["files"][1]["link"], "https://x/a.jpg?dl=1");
        assert_mocks(mocks).await;
    }

    #[rstest]
    #[case::no_files(json!({}), "no_files")]
    #[case::empty_files(json!({ "files": [] }), "no_files")]
    #[case::too_many(
        json!({ "files": [file("a.jpg", "image/jpeg", "YQ=="), file("b.jpg", "image/jpeg", "Yg=="), file("c.jpg", "image/jpeg", "Yw==")] }),
        "too_many_files"
    )]
    #[case::declared_size(
        json!({ "files": [{ "name": "a.jpg", "type": "image/jpeg", "data": "YWJj", "size": 17 }] }),
        "file_too_large"
    )]
    #[case::bad_mime(json!({ "files": [file("a.jpg", "text/html", "YWJj")] }), "bad_mime")]
    #[case::bad_extension(json!({ "files": [file("a.exe", "image/jpeg", "YWJj")] }), "bad_extension")]
    #[case::bad_base64(json!({ "files": [file("a.jpg", "image/jpeg", "@@@@")] }), "bad_encoding")]
    #[tokio::test]
    async fn test_validation_rejects_without_provider_calls(
        #[case] body: Value,
        #[case] reason: &str,
    ) {
        let mut server = Server::new_async().await;
        let mocks = no_provider_calls(&mut server).await;

        let (status, response) = send(app(&server), json_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], reason);
        assert!(response["details"]["message"].is_string());
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_validation_names_offending_file() {
        let mut server = Server::new_async().await;
        let mocks = no_provider_calls(&mut server).await;

        let (_, response) = send(
            app(&server),
            json_request(&json!({ "files": [
                file("ok.jpg", "image/jpeg", "YWJj"),
                file("evil.jpg", "text/html", "YWJj"),
            ] })),
        )
        .await;

        assert_eq!(response["details"]["file"], "evil.jpg");
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_oversized_multipart_part() {
        let mut server = Server::new_async().await;
        let mocks = no_provider_calls(&mut server).await;

        let oversized = "x".repeat(17);
        let (status, response) = send(
            app(&server),
            multipart_request(&[("file", Some(("a.jpg", "image/jpeg")), oversized.as_str())]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "file_too_large");
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_body_over_request_limit() {
        let mut server = Server::new_async().await;
        let mocks = no_provider_calls(&mut server).await;

        let padding = "A".repeat(200 * 1024);
        let (status, response) = send(
            app(&server),
            json_request(&json!({ "files": [file("a.jpg", "image/jpeg", &padding)] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "body_too_large");
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_body_limit_reached_inside_file_part() {
        let mut server = Server::new_async().await;
        let mocks = no_provider_calls(&mut server).await;
        let limit = UploadLimits::new()
            .with_max_files(2)
            .with_max_file_size(16)
            .request_body_limit();

        // First chunk fits the limit exactly up to the start of the file data;
        // the second chunk crosses it while the file part is being read.
        let head = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\n");
        let file_head = format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nabc"
        );
        let padding = "p".repeat(limit - 2 - head.len() - file_head.len());
        let first = format!("{head}{padding}{file_head}");
        let second = format!("defgh\r\n--{BOUNDARY}--\r\n");
        assert_eq!(first.len(), limit - 2);

        let chunks = vec![
            Ok::<_, std::io::Error>(axum::body::Bytes::from(first)),
            Ok(axum::body::Bytes::from(second)),
        ];
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();

        let (status, response) = send(app(&server), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "body_too_large");
        assert_mocks(mocks).await;
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let server = Server::new_async().await;
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let (status, response) = send(app(&server), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "unsupported_content_type");
    }

    #[rstest]
    #[case("GET")]
    #[case("PUT")]
    #[case("DELETE")]
    #[tokio::test]
    async fn test_other_methods_not_allowed(#[case] method: &str) {
        let server = Server::new_async().await;
        let request = HttpRequest::builder()
            .method(method)
            .uri("/api/upload")
            .body(Body::empty())
            .unwrap();

        let response = app(&server).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "method_not_allowed");
    }

    #[tokio::test]
    async fn test_rejected_grant_is_bad_gateway() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth2/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/2/files/upload")
            .expect(0)
            .create_async()
            .await;

        let (status, response) = send(
            app(&server),
            json_request(&json!({ "files": [file("a.jpg", "image/jpeg", "YWJj")] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(response["error"], "provider_auth_failed");
        assert_eq!(response["details"], json!({ "error": "invalid_grant" }));
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_file_reported_in_outcome() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"T"}"#)
            .create_async()
            .await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .with_status(409)
            .with_body(r#"{"error_summary":"path/conflict/file/..","error":{".tag":"path"}}"#)
            .create_async()
            .await;

        let (status, response) = send(
            app(&server),
            json_request(&json!({ "files": [file("a.jpg", "image/jpeg", "YWJj")] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["success"], true);
        assert_eq!(response["files"][0]["name"], "a.jpg");
        assert_eq!(response["files"][0]["error"]["kind"], "upload");
        assert_eq!(
            response["files"][0]["error"]["details"]["error_summary"],
            "path/conflict/file/.."
        );
    }

    #[tokio::test]
    async fn test_length_limit_maps_to_body_too_large() {
        let err = axum::body::to_bytes(Body::from("0123456789abc"), 10)
            .await
            .unwrap_err();
        assert_eq!(body_error(&err, 10), ValidationError::BodyTooLarge { max: 10 });
    }

    #[test]
    fn test_other_body_errors_are_malformed() {
        let err = axum::Error::new(std::io::Error::other("reset"));
        assert_eq!(body_error(&err, 10).reason(), "malformed_body");
    }
}
