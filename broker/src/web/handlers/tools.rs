// Tool listing and invocation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, warn};

use super::common::{ApiResponse, ApiResult, ToolCallRequest};
use crate::services::ToolInfo;
use crate::web::AppState;

pub async fn list_tools(State(state): State<AppState>) -> ApiResult<Vec<ToolInfo>> {
    Ok(Json(ApiResponse::success(state.tools.list_tools())))
}

/// Tool failures are reported in the body; only unknown names are 404
pub async fn call_tool(
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ToolCallRequest>,
) -> ApiResult<String> {
    if !state.tools.has_tool(&name) {
        warn!("Call to unknown tool {}", name);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Unknown tool '{}'", name))),
        ));
    }

    debug!("Tool call: {}", name);
    let reply = state
        .tools
        .call(&name, &request.arguments, request.context.as_ref())
        .await;

    let response = if reply.success {
        ApiResponse::success(reply.text)
    } else {
        ApiResponse::failure(reply.text)
    };
    Ok(Json(response))
}
