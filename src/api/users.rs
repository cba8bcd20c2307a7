use actix_web::{web, HttpResponse};

use crate::database::UserStore;
use crate::middleware::UniqueEmail;
use crate::models::{
    ErrorResponse, MessageResponse, NewUser, UpdateUserRequest, UserResponse,
};
use crate::utils::{store_failure, AppError};

pub const USER_NOT_FOUND: &str = "User not found";
pub const USER_ID_NOT_FOUND: &str = "User with such ID was not found";

/// GET /user - Lists every stored user
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_users(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let users = store
        .list()
        .await
        .map_err(store_failure("Failed to list users"))?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// GET /user/{id} - Fetches one user
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User object", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_user(
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match store
        .find_by_id(&id)
        .await
        .map_err(store_failure("Failed to fetch user"))?
    {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse::from(user))),
        None => Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
    }
}

/// POST /user - Creates a user once the email check has passed
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body = NewUser,
    responses(
        (status = 201, description = "The user was successfully created", body = UserResponse),
        (status = 400, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_user(
    store: web::Data<dyn UserStore>,
    body: UniqueEmail,
) -> Result<HttpResponse, AppError> {
    let user = store
        .insert(body.into_inner())
        .await
        .map_err(store_failure("Failed to create user"))?;

    log::info!("👤 Created user {}", user.id);

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PATCH /user - Overwrites name, surname and email of the user named by `_id`
#[utoipa::path(
    patch,
    path = "/user",
    tag = "Users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The user was successfully updated", body = MessageResponse),
        (status = 404, description = "User was not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_user(
    store: web::Data<dyn UserStore>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    // An update without an id matches nothing.
    let Some(id) = body.id.as_deref() else {
        return Err(AppError::NotFound(USER_ID_NOT_FOUND.to_string()));
    };

    let changes = body
        .changes()
        .map_err(store_failure("Failed to update user"))?;

    match store
        .update_by_id(id, changes)
        .await
        .map_err(store_failure("Failed to update user"))?
    {
        Some(_) => Ok(HttpResponse::Ok().json(MessageResponse::ok())),
        None => Err(AppError::NotFound(USER_ID_NOT_FOUND.to_string())),
    }
}

/// DELETE /user/{id} - Removes a user permanently
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    // Store errors are not handled here; they leave the handler as the request error.
    match store.delete_by_id(&id).await? {
        Some(_) => Ok(HttpResponse::Ok().json(MessageResponse::ok())),
        None => Err(AppError::NotFound(USER_ID_NOT_FOUND.to_string())),
    }
}
