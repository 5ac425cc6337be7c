pub mod records;

use axum::{routing::get, Json, Router};
use service::records::{RecordService, User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub users: RecordService<User>,
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Collection routes, relative to the API prefix.
fn record_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/:collection",
            get(records::list_all)
                .post(records::create_one)
                .delete(records::delete_all),
        )
        .route(
            "/:collection/:resource",
            get(records::get_one)
                .put(records::update_one)
                .delete(records::delete_one),
        )
}

/// Build the full application router: health check plus collection routes under `prefix`.
pub fn build_router(state: ServerState, prefix: &str, cors: CorsLayer) -> Router {
    let public = Router::new().route("/health", get(health));

    let api = if prefix == "/" {
        record_routes()
    } else {
        Router::new().nest(prefix, record_routes())
    };

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时记录状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx 以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
