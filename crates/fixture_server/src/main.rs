use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{BehaviorRecord, Product},
    error::{ApiError, ErrorCode},
    protocol::{RecommendationsQuery, HEALTH_PATH, PRODUCTS_PATH},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod faults;
mod fixtures;

use config::load_settings;
use faults::{FaultPlan, FixtureRoute};
use fixtures::FixtureSet;

/// Served when the caller does not pass `?limit=`.
const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

struct AppState {
    fixtures: FixtureSet,
    faults: FaultPlan,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let fixtures = match &settings.fixture_path {
        Some(path) => FixtureSet::load(path)?,
        None => FixtureSet::seed(),
    };
    info!(
        products = fixtures.products.len(),
        personas = fixtures.behavior.len(),
        "fixtures loaded"
    );

    let state = AppState {
        fixtures,
        faults: FaultPlan::from_settings(&settings),
    };
    let app = build_router(Arc::new(state), &settings.route_prefix);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, prefix = %settings.route_prefix, "fixture server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, route_prefix: &str) -> Router {
    let data = Router::new()
        .route(PRODUCTS_PATH, get(list_products))
        .route("/user/:persona/behavior", get(user_behavior))
        .route("/recommendations/:persona", get(recommendations));

    let data = if route_prefix.is_empty() {
        data
    } else {
        Router::new().nest(route_prefix, data)
    };

    data.route(HEALTH_PATH, get(healthz))
        .fallback(unknown_route)
        .with_state(state)
}

async fn unknown_route(uri: Uri) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, format!("no route for {uri}"))),
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Product>> {
    state.faults.apply(FixtureRoute::Products, None).await?;
    Ok(Json(state.fixtures.products.clone()))
}

async fn user_behavior(
    State(state): State<Arc<AppState>>,
    Path(persona): Path<String>,
) -> ApiResult<BehaviorRecord> {
    state
        .faults
        .apply(FixtureRoute::Behavior, Some(&persona))
        .await?;
    Ok(Json(state.fixtures.behavior_for(&persona)))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path(persona): Path<String>,
    Query(query): Query<RecommendationsQuery>,
) -> ApiResult<Vec<Product>> {
    state
        .faults
        .apply(FixtureRoute::Recommendations, Some(&persona))
        .await?;
    let limit = match query.limit {
        Some(0) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "limit must be positive")),
            ))
        }
        Some(limit) => limit as usize,
        None => DEFAULT_RECOMMENDATION_LIMIT,
    };
    let items = state.fixtures.recommendations_for(&persona, limit);
    debug!(%persona, limit, count = items.len(), "serving recommendations");
    Ok(Json(items))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
