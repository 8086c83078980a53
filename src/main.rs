use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use meeple_api::auth::{TokenCodec, TOKEN_HEADER};
use meeple_api::config;
use meeple_api::database;
use meeple_api::handlers::{accounts, boardgames, categories, login};
use meeple_api::middleware::authenticate::authenticate;
use meeple_api::middleware::authorize::{check_authorized, require_role};
use meeple_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("starting meeple-api in {:?} mode", config.environment);

    let pool = database::pool::connect()
        .await
        .unwrap_or_else(|e| panic!("database setup failed: {}", e));

    let tokens = TokenCodec::new(
        &config.security.token_secret,
        config.security.token_expiry_hours,
    )
    .unwrap_or_else(|e| panic!("token setup failed ({}): set TOKEN_SECRET", e));

    let state = AppState { pool, tokens };
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("meeple-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Resource routes
        .merge(account_routes(state.clone()))
        .merge(boardgame_routes(state.clone()))
        .merge(category_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browsers only see the token header on cross-origin responses if it is
/// explicitly exposed here.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(TOKEN_HEADER)])
}

fn account_routes(state: AppState) -> Router<AppState> {
    // login and registration are open
    let public = Router::new()
        .route("/api/accounts/login", post(login::login))
        .route("/api/accounts", post(accounts::create));

    // /own endpoints take the account from the token, nothing more
    let authenticated = Router::new()
        .route(
            "/api/accounts/own",
            get(accounts::own).put(accounts::update_own),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // listing, lookup and delete require the privileged role; the gate runs
    // authenticate, then the role check, then the authorization check
    let privileged = Router::new()
        .route("/api/accounts", get(accounts::list))
        .route(
            "/api/accounts/:accountid",
            get(accounts::get).delete(accounts::remove),
        )
        .route_layer(middleware::from_fn(check_authorized))
        .route_layer(middleware::from_fn(require_role))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    public.merge(authenticated).merge(privileged)
}

fn boardgame_routes(state: AppState) -> Router<AppState> {
    use axum::routing::put;

    // filtered search is open to everyone
    let public = Router::new().route("/api/boardgames", get(boardgames::search));

    let privileged = Router::new()
        .route("/api/boardgames", post(boardgames::create))
        .route(
            "/api/boardgames/:boardgameid",
            put(boardgames::update).delete(boardgames::remove),
        )
        .route_layer(middleware::from_fn(check_authorized))
        .route_layer(middleware::from_fn(require_role))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    public.merge(privileged)
}

fn category_routes() -> Router<AppState> {
    Router::new().route("/api/categories", get(categories::list))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "meeple-api",
            "version": version,
            "description": "REST backend for a board-game catalog",
            "endpoints": {
                "login": "POST /api/accounts/login (public)",
                "accounts": "/api/accounts[/:accountid|/own] (token required, admin for listing and delete)",
                "boardgames": "/api/boardgames[/:boardgameid] (search public, writes admin)",
                "categories": "GET /api/categories (public)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::pool::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
