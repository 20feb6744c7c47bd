use std::sync::Arc;

use axum::{extract::State, Form, Json};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ExpiriesResponse, ExpiryRequest},
};

/// Expiry dates for a symbol, soonest first.
///
/// Provider failures are logged and answered with an empty list.
#[utoipa::path(
    post,
    path = "/get_expiries",
    request_body(content = ExpiryRequest, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, body = ExpiriesResponse))
)]
pub async fn get_expiries(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ExpiryRequest>, axum::extract::rejection::FormRejection>,
) -> ApiResult<Json<ExpiriesResponse>> {
    let Form(request) = form?;

    let expiries = match state.expiry_service.list_expiries(&request.symbol).await {
        Ok(expiries) => expiries,
        Err(e) => {
            tracing::error!("Failed to list expiries for {}: {}", request.symbol, e);
            Vec::new()
        }
    };

    Ok(Json(ExpiriesResponse { expiries }))
}
