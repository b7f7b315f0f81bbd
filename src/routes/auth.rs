use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        AuthMiddleware, AuthResponse, AuthenticatedUser, LoginRequest, RegisterRequest,
        TokenService,
    },
    db,
    error::AppError,
    models::{normalize_email, User, UserDocument},
};
use actix_web::{post, web, HttpResponse, Responder};
use mongodb::bson::doc;
use mongodb::Database;
use validator::Validate;

/// Registers the authentication endpoints under `/auth`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(me)),
            ),
    );
}

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/register")]
pub async fn register(
    database: web::Data<Database>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        username,
        email,
        password,
    } = register_data.into_inner();

    let users = db::users(&database);
    let email = normalize_email(&email);
    if users.find_one(doc! { "email": email.as_str() }).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password_blocking(password).await?;
    let user = UserDocument::new(username, &email, password_hash);

    // The unique index still catches a concurrent registration of the same email.
    let inserted = users.insert_one(&user).await.map_err(|e| match AppError::from(e) {
        AppError::BadRequest(_) => AppError::BadRequest("Email already registered".into()),
        other => other,
    })?;
    let user_id = inserted
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::InternalServerError("Unexpected id type for new user".into()))?
        .to_hex();

    log::info!("Registered user {}", user_id);
    let token = tokens.generate(&user_id)?;

    Ok(HttpResponse::Created().json(AuthResponse { token, user_id }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[post("/login")]
pub async fn login(
    database: web::Data<Database>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    let user = db::users(&database)
        .find_one(doc! { "email": normalize_email(&email) })
        .await?;

    let (user_id, password_hash) = match user {
        Some(UserDocument {
            id: Some(id),
            password_hash,
            ..
        }) => (id, password_hash),
        _ => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password_blocking(password, password_hash).await? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let user_id = user_id.to_hex();
    let token = tokens.generate(&user_id)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user_id }))
}

/// Current user
///
/// Returns the profile of the user the bearer token belongs to.
pub async fn me(
    database: web::Data<Database>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let found = db::users(&database)
        .find_one(doc! { "_id": user.0 })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(User::from(found)))
}
