use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "1.0.0",
        description = "Create, read, update and delete user records stored in MongoDB.\n\n**Errors:** failing requests answer with `{\"err\": \"...\"}`."
    ),
    paths(
        // Health
        crate::api::health::hello,
        crate::api::health::health_check,

        // Users
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::database::StoreState,
            crate::models::NewUser,
            crate::models::UpdateUserRequest,
            crate::models::UserResponse,
            crate::models::ErrorResponse,
            crate::models::MessageResponse,
        )
    ),
    tags(
        (name = "Users", description = "Users managing API"),
        (name = "Health", description = "Liveness and store connection state."),
    )
)]
pub struct ApiDoc;
