/**
 * @file routes.rs
 * @author Nguyen Le Duy
 * @date 15/04/2025
 * @brief HTTP routes of the compile API.
 */
use api_types::{CompileRequest, CompileResponse};
use std::sync::Arc;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject;
use warp::{Filter, Rejection, Reply};

use crate::analyzer::MockCompiler;
use crate::compile::{CompileError, Dispatcher};

/// Every route under `/api`.
/// Rejections raised while reading a compile body are answered in the
/// `CompileResponse` shape, everything else falls through.
pub fn api(
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_dispatcher = warp::any().map(move || dispatcher.clone());

    let compile = warp::path!("compile")
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json())
        .and(with_dispatcher.clone())
        .and_then(compile_handler);

    let mock = warp::path!("compile" / "mock")
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json())
        .and(with_dispatcher.clone())
        .and_then(mock_handler);

    let status = warp::path!("compile")
        .and(warp::get())
        .and(with_dispatcher.clone())
        .and_then(status_handler);

    let boards = warp::path!("boards")
        .and(warp::get())
        .and(with_dispatcher)
        .and_then(boards_handler);

    warp::path("api")
        .and(compile.or(mock).or(status).or(boards))
        .recover(handle_rejection)
}

fn respond(
    result: Result<CompileResponse, CompileError>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(res) => warp::reply::with_status(warp::reply::json(&res), StatusCode::OK),
        Err(e) => {
            let status = e.status_code();
            warp::reply::with_status(warp::reply::json(&CompileResponse::from(e)), status)
        }
    }
}

async fn compile_handler(
    request: CompileRequest,
    dispatcher: Arc<Dispatcher>,
) -> Result<impl Reply, Rejection> {
    Ok(respond(dispatcher.compile(request).await))
}

async fn mock_handler(
    request: CompileRequest,
    dispatcher: Arc<Dispatcher>,
) -> Result<impl Reply, Rejection> {
    Ok(respond(dispatcher.compile_with(&MockCompiler, request).await))
}

async fn status_handler(dispatcher: Arc<Dispatcher>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dispatcher.status().await))
}

async fn boards_handler(dispatcher: Arc<Dispatcher>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dispatcher.boards().boards()))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (status, message) = if let Some(e) = err.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Missing content length".to_string())
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be JSON".to_string(),
        )
    } else {
        return Err(err);
    };

    log::debug!("Rejected request: {}", message);

    Ok(warp::reply::with_status(
        warp::reply::json(&CompileResponse::failure(message)),
        status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardTable;
    use crate::compile::Unconfigured;
    use crate::remote::RemoteCompiler;
    use api_types::{BoardIdentity, ServiceStatus};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    const LIMIT: u64 = 64 * 1024;
    const SKETCH: &str = "void setup(){} void loop(){}";

    fn unconfigured() -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(BoardTable::default(), Box::new(Unconfigured)))
    }

    async fn post(
        dispatcher: Arc<Dispatcher>,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, CompileResponse) {
        let res = warp::test::request()
            .method("POST")
            .path(path)
            .json(&body)
            .reply(&api(dispatcher, LIMIT))
            .await;

        (res.status(), serde_json::from_slice(res.body()).unwrap())
    }

    #[tokio::test]
    async fn test_compile_unconfigured() {
        let body = json!({ "code": SKETCH, "board": "ESP32 Dev Module" });
        let (status, res) = post(unconfigured(), "/api/compile", body).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!res.success);
        assert_eq!(res.errors.len(), 1);
        assert!(res.errors[0].starts_with("Compilation service not configured"));
    }

    #[tokio::test]
    async fn test_compile_missing_fields() {
        let body = json!({ "board": "ESP32 Dev Module", "verbose": true });
        let (status, res) = post(unconfigured(), "/api/compile", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!res.success);
        assert_eq!(res.errors, vec!["No code provided"]);

        let body = json!({ "code": SKETCH, "libraries": ["WiFi"] });
        let (status, res) = post(unconfigured(), "/api/compile", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.errors, vec!["No board specified"]);
    }

    #[tokio::test]
    async fn test_compile_unreachable_service() {
        let dispatcher = Arc::new(Dispatcher::new(
            BoardTable::default(),
            Box::new(RemoteCompiler::new("http://127.0.0.1:1")),
        ));
        let body = json!({ "code": SKETCH, "board": "Arduino Uno" });
        let (status, res) = post(dispatcher, "/api/compile", body).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!res.success);
        assert!(res.errors[0].starts_with("Failed to reach compilation service"));
    }

    #[tokio::test]
    async fn test_mock_compile() {
        let body = json!({ "code": SKETCH, "board": "ESP32 Dev Module" });
        let (status, res) = post(unconfigured(), "/api/compile/mock", body).await;

        assert_eq!(status, StatusCode::OK);
        assert!(res.success);
        assert_eq!(res.size, Some(250_000 + 34));

        let binary = STANDARD.decode(res.binary.unwrap()).unwrap();
        let payload = String::from_utf8(binary).unwrap();
        assert!(payload.contains("esp32:esp32:esp32"));
    }

    #[tokio::test]
    async fn test_mock_compile_errors_are_ok_status() {
        let body = json!({ "code": "void setup() {", "board": "arduino:avr:uno" });
        let (status, res) = post(unconfigured(), "/api/compile/mock", body).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!res.success);
        assert!(res.binary.is_none());
        assert!(!res.errors.is_empty());
    }

    #[tokio::test]
    async fn test_mock_compile_missing_code() {
        let body = json!({ "code": "", "board": "Arduino Uno" });
        let (status, res) = post(unconfigured(), "/api/compile/mock", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.errors, vec!["No code provided"]);
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/compile")
            .header("content-type", "application/json")
            .body("{ not json")
            .reply(&api(unconfigured(), LIMIT))
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res: CompileResponse = serde_json::from_slice(res.body()).unwrap();
        assert!(!res.success);
        assert!(res.errors[0].starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let body = json!({ "code": "x".repeat(256), "board": "Arduino Uno" });
        let res = warp::test::request()
            .method("POST")
            .path("/api/compile")
            .json(&body)
            .reply(&api(unconfigured(), 128))
            .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let res: CompileResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(res.errors, vec!["Request body too large"]);
    }

    #[tokio::test]
    async fn test_status_probe() {
        let res = warp::test::request()
            .method("GET")
            .path("/api/compile")
            .reply(&api(unconfigured(), LIMIT))
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let status: ServiceStatus = serde_json::from_slice(res.body()).unwrap();
        assert!(!status.service_configured);
        assert!(!status.service_online);
        assert!(status.supported_boards.contains(&"Arduino Uno".to_string()));
    }

    #[tokio::test]
    async fn test_boards() {
        let res = warp::test::request()
            .method("GET")
            .path("/api/boards")
            .reply(&api(unconfigured(), LIMIT))
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let boards: Vec<BoardIdentity> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(boards, BoardTable::default().boards());
    }

    #[tokio::test]
    async fn test_unknown_route_falls_through() {
        let res = warp::test::request()
            .method("GET")
            .path("/api/nothing")
            .reply(&api(unconfigured(), LIMIT))
            .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
