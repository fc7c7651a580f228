//! User administration endpoints (librarian only)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{UpdateUser, UpdateUserStatus, UserOut, UserQuery},
    AppState,
};

use super::AuthenticatedUser;

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Accounts sorted by name", body = Vec<UserOut>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Librarian role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserOut>>> {
    claims.require_librarian()?;

    let users = state.services.users.list_users(&query).await?;
    Ok(Json(users.into_iter().map(UserOut::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserOut),
        (status = 403, description = "Librarian role required", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserOut>> {
    claims.require_librarian()?;

    let user = state.services.users.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Edit an account's name, email or role
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserOut),
        (status = 400, description = "Invalid input or email taken", body = crate::error::ErrorResponse),
        (status = 403, description = "Librarian role required", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(changes): Json<UpdateUser>,
) -> AppResult<Json<UserOut>> {
    claims.require_librarian()?;

    let user = state
        .services
        .users
        .update_user(claims.user_id, id, changes)
        .await?;
    Ok(Json(user.into()))
}

/// Activate or deactivate an account
#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserStatus,
    responses(
        (status = 200, description = "Status changed", body = UserOut),
        (status = 400, description = "Cannot deactivate your own account", body = crate::error::ErrorResponse),
        (status = 403, description = "Librarian role required", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(status): Json<UpdateUserStatus>,
) -> AppResult<Json<UserOut>> {
    claims.require_librarian()?;

    let user = state
        .services
        .users
        .set_active(claims.user_id, id, status.is_active)
        .await?;
    Ok(Json(user.into()))
}
