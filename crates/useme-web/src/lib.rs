//! JSON-over-HTTP front for the tool registry.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tracing::{info, warn};
use useme_tools::{ToolError, ToolRegistry, ToolSpec, ToolsConfig, SERVER_NAME, SYSTEM_INSTRUCTION, TOOLS};

pub const CRATE_NAME: &str = "useme-web";

#[derive(Clone)]
pub struct AppState {
    pub registry: ToolRegistry,
}

impl AppState {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }
}

#[derive(Debug, Serialize)]
struct Catalogue {
    name: &'static str,
    instructions: &'static str,
    tools: &'static [ToolSpec],
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .route("/tools/{name}", post(call_tool_handler))
        .with_state(Arc::new(state))
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    let config = ToolsConfig::from_env();
    let state = AppState::new(ToolRegistry::from_config(&config)?);
    let listener = TcpListener::bind(("0.0.0.0", config.web_port)).await?;
    info!(target: "useme::web", port = config.web_port, base_url = %config.base_url, "serving tools");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn health_handler() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

async fn tools_handler() -> Response {
    Json(Catalogue {
        name: SERVER_NAME,
        instructions: SYSTEM_INSTRUCTION,
        tools: TOOLS,
    })
    .into_response()
}

/// Body is the tool's argument object; an empty body means "all defaults".
async fn call_tool_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        JsonValue::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, format!("malformed JSON body: {err}")),
        }
    };

    match state.registry.dispatch(&name, arguments).await {
        Ok(result) => Json(json!({ "tool": name, "result": result })).into_response(),
        Err(err) => {
            warn!(target: "useme::web", tool = %name, error = %err, "tool call rejected");
            error_response(status_for(&err), err.to_string())
        }
    }
}

fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidArguments { .. } => StatusCode::BAD_REQUEST,
        ToolError::Encode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::io::Write;
    use tower::ServiceExt;
    use useme_adapters::{Site, UsemeSource};
    use useme_storage::{CategoryCatalog, FetchError, Transport};

    struct OfflineTransport;

    #[async_trait]
    impl Transport for OfflineTransport {
        async fn get_text(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::HttpStatus {
                status: 503,
                url: url.to_string(),
            })
        }

        async fn get_json(&self, url: &str) -> Result<JsonValue, FetchError> {
            Err(FetchError::HttpStatus {
                status: 503,
                url: url.to_string(),
            })
        }

        async fn post_json(&self, url: &str, _payload: &JsonValue) -> Result<JsonValue, FetchError> {
            Err(FetchError::HttpStatus {
                status: 503,
                url: url.to_string(),
            })
        }
    }

    fn test_app(catalog: CategoryCatalog) -> Router {
        let source = UsemeSource::new(Arc::new(OfflineTransport), Site::default(), catalog);
        app(AppState::new(ToolRegistry::new(source)))
    }

    fn offline_app() -> Router {
        test_app(CategoryCatalog::new("/nonexistent/categories.json"))
    }

    async fn json_body(resp: Response) -> JsonValue {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let resp = offline_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn catalogue_lists_every_tool_with_instructions() {
        let resp = offline_app()
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["name"], "useme-job-assistant");
        assert_eq!(body["tools"].as_array().unwrap().len(), 11);
        assert_eq!(body["tools"][0]["name"], "browse_jobs");
        assert_eq!(body["tools"][0]["params"][0]["default"], "1");
        assert!(body["instructions"].as_str().unwrap().contains("Useme"));
    }

    #[tokio::test]
    async fn list_categories_reads_the_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"Copywriting","slug":"copywriting","category_id":37,"lang":"en"}},
                {{"name":"Copywriting","slug":"copywriting","category_id":37,"lang":"pl"}}]"#
        )
        .unwrap();
        let resp = test_app(CategoryCatalog::new(file.path()))
            .oneshot(post("/tools/list_categories", r#"{"language": "pl"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["tool"], "list_categories");
        assert_eq!(body["result"].as_array().unwrap().len(), 1);
        assert_eq!(body["result"][0]["lang"], "pl");
    }

    #[tokio::test]
    async fn empty_body_runs_with_defaults() {
        let resp = offline_app().oneshot(post("/tools/browse_jobs", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["result"], json!([]));
    }

    #[tokio::test]
    async fn unavailable_upstream_yields_null_result() {
        let resp = offline_app()
            .oneshot(post("/tools/get_user_profile", r#"{"profile_url": "https://useme.com/en/roles/contractor/x,1/"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(json_body(resp).await["result"].is_null());
    }

    #[tokio::test]
    async fn error_statuses() {
        let app = offline_app();
        let unknown = app.clone().oneshot(post("/tools/delete_account", "{}")).await.unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let invalid = app
            .clone()
            .oneshot(post("/tools/get_category_info", r#"{"language": "de"}"#))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let malformed = app.oneshot(post("/tools/browse_jobs", "{not json")).await.unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(malformed).await["error"]
            .as_str()
            .unwrap()
            .contains("malformed"));
    }
}
