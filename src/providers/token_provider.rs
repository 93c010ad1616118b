use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode};

use crate::config::{ConfigHandle, SecretManager};
use crate::errors::InternalError;
use crate::errors::internal::{TokenError, TokenFailClass};
use crate::providers::clock::Clock;
use crate::types::internal::{AuthenticatedIdentity, IssuedToken, SessionClaims};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and validates signed session tokens
///
/// Tokens are HS256 with the configured issuer. Validity is the half-open
/// interval `[nbf, exp)` measured against the injected clock.
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    config: Arc<ConfigHandle>,
    clock: Arc<dyn Clock>,
}

impl TokenProvider {
    pub fn new(secret_manager: Arc<SecretManager>, config: Arc<ConfigHandle>, clock: Arc<dyn Clock>) -> Self {
        Self { secret_manager, config, clock }
    }

    pub fn issue(&self, identity: &AuthenticatedIdentity) -> Result<IssuedToken, InternalError> {
        let settings = self.config.snapshot().token.clone();
        let now = self.clock.unix_now();
        let expires_at = settings
            .expiry_hours
            .checked_mul(3600)
            .and_then(|lifetime| now.checked_add(lifetime))
            .ok_or_else(|| {
                InternalError::crypto(
                    "token_issue",
                    format!("token lifetime of {} hours is out of range", settings.expiry_hours),
                )
            })?;

        let claims = SessionClaims {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone().unwrap_or_default(),
            full_name: identity.full_name.clone(),
            role: identity.role,
            sub: identity.user_id.clone(),
            iss: settings.issuer,
            iat: now,
            nbf: now,
            exp: expires_at,
        };

        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("token_issue", e.to_string()))?;

        tracing::debug!(user_id = %identity.user_id, expires_at, "session token issued");

        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let result = self.validate_inner(token);
        if let Err(err) = &result {
            tracing::debug!(class = ?err.class, "session token rejected: {}", err.detail);
        }
        result
    }

    fn validate_inner(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::from_jwt(&e))?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::new(
                TokenFailClass::AlgorithmMismatch,
                format!("unexpected algorithm {:?}", header.alg),
            ));
        }

        let issuer = self.config.snapshot().token.issuer.clone();

        // exp/nbf are checked below against our clock, without leeway
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub", "iss"]);

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| TokenError::from_jwt(&e))?
        .claims;

        let now = self.clock.unix_now();
        if now < claims.nbf {
            return Err(TokenError::new(TokenFailClass::NotYetValid, format!("nbf {} > now {}", claims.nbf, now)));
        }
        if now >= claims.exp {
            return Err(TokenError::new(TokenFailClass::Expired, format!("exp {} <= now {}", claims.exp, now)));
        }
        if claims.sub != claims.user_id {
            return Err(TokenError::new(TokenFailClass::Malformed, "sub does not match user_id"));
        }

        Ok(claims)
    }
}
