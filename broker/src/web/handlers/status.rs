// Pool status and liveness endpoints

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use super::common::{ApiResponse, ApiResult};
use crate::services::PoolStatus;
use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> ApiResult<PoolStatus> {
    Ok(Json(ApiResponse::success(state.tools.dispatcher().status())))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "operations": state.tools.dispatcher().catalog().len(),
        "sessions": state.store.session_count(),
    }))
}
