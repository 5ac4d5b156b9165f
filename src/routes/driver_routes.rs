use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::tracking_controller::TrackingController;
use crate::dto::api_response::ApiResponse;
use crate::dto::bus_dto::{BusResponse, LocationAck};
use crate::middleware::auth::{auth_middleware, authenticate, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas del conductor. Todas requieren token. El envío de posiciones
/// autentica y aplica el rate limit por su cuenta para que cualquier fallo,
/// incluidos 401 y 429, salga con el sobre `LocationAck`.
pub fn driver_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/start_tracking/:id", get(start_tracking).post(start_tracking))
        .route("/stop_tracking/:id", get(stop_tracking).post(stop_tracking))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/update_location/:id", post(update_location))
}

async fn update_location(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<LocationAck>) {
    match ingest(&state, bus_id, &headers, &body).await {
        Ok(()) => (StatusCode::OK, Json(LocationAck::ok())),
        Err(e) => {
            e.log();
            (
                e.status_code(),
                Json(LocationAck::failed(e.client_message(), e.code())),
            )
        }
    }
}

async fn ingest(
    state: &AppState,
    bus_id: i64,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), AppError> {
    let user = authenticate(state, headers).await?;
    state.rate_limit.check_user(&user).await?;

    TrackingController::new(state)
        .push_location(&user, bus_id, body)
        .await?;
    Ok(())
}

async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<BusResponse>>, AppError> {
    let controller = TrackingController::new(&state);
    let buses = controller.assigned_buses(&user).await?;
    Ok(Json(buses.into_iter().map(BusResponse::from).collect()))
}

async fn start_tracking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bus_id): Path<i64>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = TrackingController::new(&state);
    let bus = controller.start_tracking(&user, bus_id).await?;
    Ok(Json(ApiResponse::success_with_message(bus.into(), "Tracking started")))
}

async fn stop_tracking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bus_id): Path<i64>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = TrackingController::new(&state);
    let bus = controller.stop_tracking(&user, bus_id).await?;
    Ok(Json(ApiResponse::success_with_message(bus.into(), "Tracking stopped")))
}
