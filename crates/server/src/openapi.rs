use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::register,
        crate::routes::auth::is_admin,
    ),
    components(
        schemas(
            HealthResponse,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::LoginResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::RegisterResponse,
            crate::routes::auth::IsAdminRequest,
            crate::routes::auth::IsAdminResponse,
            crate::errors::ErrorBody,
            crate::errors::Status,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth", description = "Login, registration and admin checks")
    )
)]
pub struct ApiDoc;
