//! Web server for the console UI
//!
//! Serves the embedded web UI and proxies API requests to the backend.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Response, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use kopia_console_shared::{ApiErrorBody, CSRF_META_NAME};
use rust_embed::RustEmbed;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{BasicAuth, ConsoleConfig};

/// Error code returned when the backend cannot be reached
pub const BACKEND_UNAVAILABLE: &str = "BACKEND_UNAVAILABLE";

/// Embedded UI assets (compiled WASM app)
#[derive(RustEmbed)]
#[folder = "../ui/dist/"]
struct UiAssets;

/// Server state shared across all handlers
pub struct ServerState {
    pub backend_url: String,
    pub http_client: reqwest::Client,
    pub basic_auth: Option<BasicAuth>,
    /// `index.html` with the CSRF meta tag already in place
    pub index_html: Option<String>,
}

impl ServerState {
    pub fn new(config: &ConsoleConfig) -> Self {
        let index_html = UiAssets::get("index.html")
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
            .map(|html| inject_csrf_meta(&html, config.csrf_token.as_deref()));
        if index_html.is_none() {
            warn!("UI assets missing index.html; build the UI with trunk first");
        }

        Self {
            backend_url: config.server_url.clone(),
            http_client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            basic_auth: config.basic_auth.clone(),
            index_html,
        }
    }
}

/// Build the router: health, API proxy, embedded UI
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/*rest", any(proxy_api))
        .route("/", get(serve_index))
        // Static files and SPA routing
        .fallback(serve_static)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn start_server(
    config: &ConsoleConfig,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let state = Arc::new(ServerState::new(config));
    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("UI server listening on {}", addr);
    info!("Proxying API requests to {}", config.server_url);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))
    });

    Ok(handle)
}

/// Insert `<meta name="kopia-csrf-token">` into the page head.
///
/// Without a token the page is returned unchanged and the UI sends the
/// fallback value.
pub fn inject_csrf_meta(html: &str, token: Option<&str>) -> String {
    let Some(token) = token else {
        return html.to_string();
    };

    let meta = format!(
        r#"<meta name="{}" content="{}" />"#,
        CSRF_META_NAME,
        escape_attribute(token)
    );
    match html.find("</head>") {
        Some(pos) => format!("{}{}\n{}", &html[..pos], meta, &html[pos..]),
        None => format!("{}\n{}", meta, html),
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Forward `/api/v1/*` to the backend
async fn proxy_api(State(state): State<Arc<ServerState>>, req: Request<Body>) -> Response<Body> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.backend_url, path_and_query);
    proxy_request(&state, &url, req).await
}

/// Generic request proxy
async fn proxy_request(state: &ServerState, url: &str, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let headers = req.headers().clone();

    let body_bytes = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Failed to read request body: {}", e),
            )
                .into_response();
        }
    };

    let mut proxy_req = state.http_client.request(method.clone(), url);
    for (name, value) in headers.iter() {
        if name != header::HOST && name != header::CONTENT_LENGTH {
            proxy_req = proxy_req.header(name, value);
        }
    }
    if let Some(auth) = &state.basic_auth {
        if !headers.contains_key(header::AUTHORIZATION) {
            proxy_req = proxy_req.basic_auth(&auth.username, auth.password.as_ref());
        }
    }
    proxy_req = proxy_req.body(body_bytes);

    match proxy_req.send().await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let upstream_headers = response.headers().clone();
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => return backend_unavailable(&method, url, e),
            };
            tracing::debug!("{} {} -> {}", method, url, status);

            let mut res = Response::new(Body::from(body));
            *res.status_mut() = status;
            for (name, value) in upstream_headers.iter() {
                if name != header::TRANSFER_ENCODING && name != header::CONTENT_LENGTH {
                    res.headers_mut().append(name, value.clone());
                }
            }
            res
        }
        Err(e) => backend_unavailable(&method, url, e),
    }
}

fn backend_unavailable(method: &axum::http::Method, url: &str, e: reqwest::Error) -> Response<Body> {
    error!("Failed to proxy {} {}: {}", method, url, e);
    let body = ApiErrorBody {
        code: Some(BACKEND_UNAVAILABLE.to_string()),
        error: format!("Unable to reach the repository server: {}", e),
    };
    (StatusCode::BAD_GATEWAY, Json(body)).into_response()
}

/// Serve index.html
async fn serve_index(State(state): State<Arc<ServerState>>) -> Response<Body> {
    match &state.index_html {
        Some(html) => {
            let mut res = Response::new(Body::from(html.clone()));
            res.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            res.headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            res
        }
        None => (StatusCode::NOT_FOUND, "UI not built").into_response(),
    }
}

/// Serve static files from embedded assets (fallback handler)
async fn serve_static(State(state): State<Arc<ServerState>>, req: Request<Body>) -> Response<Body> {
    let path = req.uri().path().to_string();
    tracing::debug!("Fallback handler called for path: {}", path);

    // index.html always goes through the rendered copy
    if path.trim_start_matches('/') != "index.html" {
        if let Some(response) = try_serve_file(&path) {
            return response;
        }
    }

    // SPA routing: non-asset paths get the app
    if !path.contains('.') || path.ends_with("index.html") {
        return serve_index(State(state)).await;
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn try_serve_file(path: &str) -> Option<Response<Body>> {
    let path = path.trim_start_matches('/');
    UiAssets::get(path).map(|content| {
        let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
        (
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
            ],
            content.data.into_owned(),
        )
            .into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_lands_in_head() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        let out = inject_csrf_meta(html, Some("tok"));
        let meta = r#"<meta name="kopia-csrf-token" content="tok" />"#;
        assert!(out.contains(meta));
        assert!(out.find(meta).unwrap() < out.find("</head>").unwrap());
    }

    #[test]
    fn test_no_token_leaves_page_alone() {
        let html = "<html><head></head></html>";
        assert_eq!(inject_csrf_meta(html, None), html);
    }

    #[test]
    fn test_token_is_escaped() {
        let out = inject_csrf_meta("<head></head>", Some(r#"a"b<c"#));
        assert!(out.contains(r#"content="a&quot;b&lt;c""#));
    }

    #[test]
    fn test_page_without_head() {
        let out = inject_csrf_meta("<p>hi</p>", Some("t"));
        assert!(out.starts_with("<meta name=\"kopia-csrf-token\""));
        assert!(out.ends_with("<p>hi</p>"));
    }
}
