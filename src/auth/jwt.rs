use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::configuration::JWTSettings;

// Verifies tokens minted by the external auth collaborator. Token issuance
// lives there; this service only needs to recover (user_id, role).
#[derive(Clone)]
pub struct Tokenizer{
    pub secret: SecretString,
    pub expiry_hours: u64
}

impl Tokenizer {
    pub fn new(settings: &JWTSettings) -> Self {
        Self{
            secret: SecretString::new(settings.secret.clone().into()),
            expiry_hours: settings.expiry_hours
        }
    }

    pub fn generate_key(&self, user_id: Uuid, role: UserRole) -> String{
        let expiry = Utc::now() + Duration::hours(self.expiry_hours as i64);

        let claims = Claims{
            sub: user_id,
            exp: expiry.timestamp() as usize,
            role
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
        )
        .expect("Failed to encode JWT claims")
    }

    pub fn decode_key(&self, token: String) -> Option<Claims>{
        match jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256)
        ) {
            Ok(decoded_data) => Some(decoded_data.claims),
            Err(_) => None
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims{
    pub sub: Uuid,
    pub exp: usize,
    pub role: UserRole
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum UserRole{
    STAFF,
    STUDENT,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_settings() -> JWTSettings {
        JWTSettings {
            secret: "test_secret".to_string(),
            expiry_hours: 24,
        }
    }

    #[test]
    fn generated_token_decodes_to_same_claims() {
        let tokenizer = Tokenizer::new(&create_test_settings());
        let user_id = Uuid::new_v4();
        let token = tokenizer.generate_key(user_id, UserRole::STUDENT);

        let claims = tokenizer.decode_key(token).expect("Failed to decode token");

        assert_eq!(claims.sub, user_id);
        assert!(matches!(claims.role, UserRole::STUDENT));
    }

    #[test]
    fn staff_role_survives_round_trip() {
        let tokenizer = Tokenizer::new(&create_test_settings());
        let user_id = Uuid::new_v4();
        let token = tokenizer.generate_key(user_id, UserRole::STAFF);

        let claims = tokenizer.decode_key(token).expect("Failed to decode token");

        assert_eq!(claims.sub, user_id);
        assert!(matches!(claims.role, UserRole::STAFF));
    }

    #[test]
    fn token_expiry_matches_settings() {
        let tokenizer = Tokenizer::new(&create_test_settings());
        let token = tokenizer.generate_key(Uuid::new_v4(), UserRole::STUDENT);

        let claims = tokenizer.decode_key(token).expect("Failed to decode token");
        let expected_expiry = Utc::now() + chrono::Duration::hours(24);

        // Allow for small time differences during test execution
        assert!(
            (claims.exp as i64 - expected_expiry.timestamp()).abs() < 5,
            "Expiry time differs significantly from expected"
        );
    }

    #[test]
    fn invalid_token_is_rejected() {
        let tokenizer = Tokenizer::new(&create_test_settings());
        assert!(tokenizer.decode_key("invalid_token".to_string()).is_none());
    }

    #[test]
    fn token_from_different_secret_is_rejected() {
        let tokenizer1 = Tokenizer::new(&JWTSettings {
            secret: "secret1".to_string(),
            expiry_hours: 24,
        });
        let token = tokenizer1.generate_key(Uuid::new_v4(), UserRole::STUDENT);

        let tokenizer2 = Tokenizer::new(&JWTSettings {
            secret: "secret2".to_string(),
            expiry_hours: 24,
        });
        assert!(tokenizer2.decode_key(token).is_none());
    }
}
