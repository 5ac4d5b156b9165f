use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::assignment_controller::AssignmentController;
use crate::dto::api_response::ApiResponse;
use crate::dto::bus_dto::{
    AssignBusRequest, AssignmentOverview, BusResponse, DriverResponse, SetStatusRequest,
    UpdateBusRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de administración de la flota (rol admin)
pub fn editor_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/bus/update", post(update_bus))
        .route("/bus/:id/status", post(set_status))
        .route("/assign_bus", get(assignment_overview).post(assign_bus))
        .route("/drivers", get(list_drivers))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn update_bus(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateBusRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = AssignmentController::new(&state);
    let response = controller.update_bus(&user, request).await?;
    Ok(Json(response))
}

async fn assign_bus(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<AssignBusRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = AssignmentController::new(&state);
    let response = controller.assign(&user, request).await?;
    Ok(Json(response))
}

async fn assignment_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<AssignmentOverview>, AppError> {
    let controller = AssignmentController::new(&state);
    let overview = controller.overview(&user).await?;
    Ok(Json(overview))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let controller = AssignmentController::new(&state);
    let drivers = controller.list_drivers(&user).await?;
    Ok(Json(drivers))
}

async fn set_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bus_id): Path<i64>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<ApiResponse<BusResponse>>, AppError> {
    let controller = AssignmentController::new(&state);
    let response = controller.set_status(&user, bus_id, request).await?;
    Ok(Json(response))
}
