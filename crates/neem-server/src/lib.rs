pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Path prefix shared by every route.
pub const API_PREFIX: &str = "/knowrob/api/v1.0";

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(routes::data::health))
        // VR sessions
        .route(
            "/create_actor_by_given_name",
            get(routes::actors::create_actor_by_given_name)
                .post(routes::actors::create_actor_by_given_name),
        )
        .route(
            "/create_episode",
            get(routes::episodes::create_episode).post(routes::episodes::create_episode),
        )
        .route(
            "/finish_episode",
            get(routes::episodes::finish_episode).post(routes::episodes::finish_episode),
        )
        .route(
            "/add_subaction_with_task",
            get(routes::actions::add_subaction_with_task)
                .post(routes::actions::add_subaction_with_task),
        )
        .route(
            "/add_additional_pouring_information",
            get(routes::actions::add_additional_pouring_information)
                .post(routes::actions::add_additional_pouring_information),
        )
        // Canned NEEM-data queries
        .route("/{function}", get(routes::data::run_query));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(app_state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(app_state, listener).await
}

/// Serve on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(app_state);

    tracing::info!("NEEM interface listening on http://{addr}{API_PREFIX}");

    axum::serve(listener, app).await?;
    Ok(())
}
