use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tictactoe::{
    best_move, evaluate_board, play, EvaluateRequest, GameError, MoveRequest, PlayRequest,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod relay;

use config::Config;
use relay::Relay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    let app = app_router(Arc::new(Relay::default()), &config.static_dir);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn app_router(relay: Arc<Relay>, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/move", post(handle_move))
        .route("/play", post(handle_play))
        .route("/evaluate", post(handle_evaluate));
    let spa = Router::new().nest_service(
        "/",
        ServeDir::new(static_dir).append_index_html_on_directories(true),
    );
    Router::new()
        .nest("/api", api)
        .route("/ws", get(relay::ws_handler))
        .with_state(relay)
        .merge(spa)
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

async fn handle_move(Json(request): Json<MoveRequest>) -> Result<impl IntoResponse, ApiError> {
    // Deep searches are CPU bound; keep them off the async workers.
    let mv = tokio::task::spawn_blocking(move || best_move(request)).await??;
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(mv)))
}

async fn handle_play(Json(request): Json<PlayRequest>) -> Result<impl IntoResponse, ApiError> {
    let played = play(request)?;
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(played)))
}

async fn handle_evaluate(
    Json(request): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let verdict = evaluate_board(request)?;
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(verdict)))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is::<GameError>() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tictactoe::{MoveResponse, Outcome, PlayResponse, Side};
    use tower::util::ServiceExt;

    fn app() -> Router {
        app_router(Arc::new(Relay::default()), Path::new("web/dist"))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn http_move_endpoint() {
        let response = app()
            .oneshot(post_json(
                "/api/move",
                r#"{"board":"XX..O....","side":"o","variant":"classic","difficulty":"hard"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mv: MoveResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(mv.index, Some(2));
    }

    #[tokio::test]
    async fn http_play_endpoint_applies_eviction() {
        let response = app()
            .oneshot(post_json(
                "/api/play",
                r#"{"board":"XX.OO...X","variant":"infinite","side":"x","index":2,
                    "histories":{"x":[0,1,8],"o":[3,4]}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let played: PlayResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(played.evicted, Some(0));
        assert_eq!(played.board, ".XXOO...X");
    }

    #[tokio::test]
    async fn http_evaluate_endpoint() {
        let response = app()
            .oneshot(post_json(
                "/api/evaluate",
                r#"{"board":"OOOXX.X..","variant":"classic"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let verdict: tictactoe::EvaluateResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            verdict.outcome,
            Outcome::Win {
                side: Side::O,
                line: [0, 1, 2]
            }
        );
    }

    #[tokio::test]
    async fn invalid_board_is_bad_request() {
        let response = app()
            .oneshot(post_json(
                "/api/move",
                r#"{"board":"XX","side":"o","variant":"classic","difficulty":"easy"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("needs 9 cells"));
    }
}
