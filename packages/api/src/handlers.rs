// ABOUTME: HTTP request handlers for token management
// ABOUTME: List, issue, show, and idempotent delete of the caller's tokens

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use tessera_core::Token;

use crate::auth::Provided;
use crate::error::{ApiResult, AppError};
use crate::response::ApiResponse;
use crate::service::TokenApi;

/// List the caller's tokens
pub async fn list_tokens(
    State(api): State<Arc<TokenApi>>,
    Provided(ctx): Provided,
) -> ApiResult<Json<ApiResponse<Vec<Token>>>> {
    info!(user_id = %ctx.user_id, "Listing tokens");

    let tokens = api.list(&ctx).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// Issue a token for the caller under the caller's policy
pub async fn create_token(
    State(api): State<Arc<TokenApi>>,
    Provided(ctx): Provided,
) -> ApiResult<(StatusCode, Json<ApiResponse<Token>>)> {
    info!(user_id = %ctx.user_id, policy = %ctx.policy_name, "Creating token");

    let token = api.create(&ctx).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(token))))
}

/// Show one of the caller's tokens
pub async fn get_token(
    State(api): State<Arc<TokenApi>>,
    Provided(ctx): Provided,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Token>>> {
    info!(user_id = %ctx.user_id, "Getting token");

    api.get_owned(&ctx, &id)
        .await?
        .map(|token| Json(ApiResponse::success(token)))
        .ok_or_else(AppError::not_found)
}

/// Delete a token. Answers 204 whether or not the token existed.
pub async fn delete_token(
    State(api): State<Arc<TokenApi>>,
    Provided(ctx): Provided,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    info!(user_id = %ctx.user_id, "Deleting token");

    api.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
