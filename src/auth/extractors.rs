use actix_web::{error::ErrorUnauthorized, web, FromRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use super::jwt::{Tokenizer, UserRole};

// Extractor for staff role
pub struct IsStaff(pub Uuid);

// Extractor for any signed-in user; second field marks staff
pub struct IsUser(pub Uuid, pub bool);

fn bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer")?.trim();
    Some(token.to_string())
}

impl FromRequest for IsStaff {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let tokenizer: &web::Data<Tokenizer> = req.app_data().expect("Tokenizer missing from app data");

        match bearer_token(req) {
            Some(token) => {
                match tokenizer.decode_key(token){
                    Some(claims) => {
                        match claims.role {
                            UserRole::STAFF => ready(Ok(IsStaff(claims.sub))),
                            _ => ready(Err(ErrorUnauthorized("Unauthorized Role")))
                        }
                    },
                    None => ready(Err(ErrorUnauthorized("Invalid Token")))
                }
            },
            None => ready(Err(ErrorUnauthorized("Invalid token")))
        }
    }
}

impl FromRequest for IsUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let tokenizer: &web::Data<Tokenizer> = req.app_data().expect("Tokenizer missing from app data");

        match bearer_token(req) {
            Some(token) => {
                match tokenizer.decode_key(token){
                    Some(claims) => {
                        match claims.role {
                            UserRole::STUDENT => ready(Ok(IsUser(claims.sub, false))),
                            UserRole::STAFF => ready(Ok(IsUser(claims.sub, true)))
                        }
                    },
                    None => ready(Err(ErrorUnauthorized("Invalid Token")))
                }
            },
            None => ready(Err(ErrorUnauthorized("Invalid token")))
        }
    }
}
