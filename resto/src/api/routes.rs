use axum::{
    routing::get,
    Router,
    extract::{State, Query},
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::models::{ActionQuery, ApiResponse, RestaurantQueryParams};
use crate::query::QuerySpec;
use crate::services::restaurants::AVAILABLE_ACTIONS;
use crate::services::{AppError, RestaurantService};

type ApiResult = Result<Response, AppError>;

// Decoded as raw pairs so a repeated key is never rejected; the last one wins
type QueryPairs = Query<Vec<(String, String)>>;

pub async fn list_restaurants(
    Query(pairs): QueryPairs,
    State(service): State<Arc<RestaurantService>>,
) -> ApiResult {
    let params = RestaurantQueryParams::from_pairs(&pairs);
    let spec = QuerySpec::from_params(&params);
    let page = service.search(&spec).await?;

    Ok(Json(ApiResponse::paginated(page.rows, page.meta)).into_response())
}

pub async fn ping(State(service): State<Arc<RestaurantService>>) -> ApiResult {
    Ok(Json(ApiResponse::success(service.ping().await?)).into_response())
}

pub async fn count(State(service): State<Arc<RestaurantService>>) -> ApiResult {
    Ok(Json(ApiResponse::success(service.count().await?)).into_response())
}

pub async fn sample(State(service): State<Arc<RestaurantService>>) -> ApiResult {
    Ok(Json(ApiResponse::success(service.sample().await?)).into_response())
}

pub async fn filter_options(State(service): State<Arc<RestaurantService>>) -> ApiResult {
    Ok(Json(ApiResponse::success(service.filter_options().await?)).into_response())
}

pub async fn debug_info(State(service): State<Arc<RestaurantService>>) -> ApiResult {
    Ok(Json(ApiResponse::success(service.debug_info().await?)).into_response())
}

// Single entry point keyed by `?action=`, for clients of the lab API
pub async fn dispatch_action(
    Query(pairs): QueryPairs,
    state: State<Arc<RestaurantService>>,
) -> ApiResult {
    let action = ActionQuery::from_pairs(&pairs);

    match action.action.as_deref().unwrap_or("") {
        "ping" => ping(state).await,
        "count" => count(state).await,
        "sample" => sample(state).await,
        "filter-options" => filter_options(state).await,
        "debug-info" => debug_info(state).await,
        "restaurants" => list_restaurants(Query(pairs), state).await,
        _ => Err(AppError::bad_request(format!(
            "Invalid action. Available actions: {}",
            AVAILABLE_ACTIONS.join(", ")
        ))),
    }
}

// Define all API routes
pub fn routes(service: Arc<RestaurantService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api", get(dispatch_action))
        .route("/api/ping", get(ping))
        .route("/api/count", get(count))
        .route("/api/sample", get(sample))
        .route("/api/filter-options", get(filter_options))
        .route("/api/debug-info", get(debug_info))
        .route("/api/restaurants", get(list_restaurants))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
