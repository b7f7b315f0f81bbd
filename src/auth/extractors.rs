use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the authenticated user's id from the `Claims` that `AuthMiddleware`
/// stored in the request extensions.
///
/// Fails with `AppError::Unauthorized` when no claims are present or the subject
/// is not a valid ObjectId.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub ObjectId);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let subject = req.extensions().get::<Claims>().map(|claims| claims.sub.clone());
        let result = match subject {
            Some(sub) => ObjectId::parse_str(&sub)
                .map(AuthenticatedUser)
                .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".into())),
            None => Err(AppError::Unauthorized(
                "User ID not found in request. Ensure AuthMiddleware is active.".into(),
            )),
        };
        ready(result.map_err(Into::into))
    }
}
