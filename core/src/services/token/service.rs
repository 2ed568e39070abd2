//! Main token service implementation

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;

/// Length of the opaque refresh token handed to clients
const REFRESH_TOKEN_LENGTH: usize = 64;

/// Service for managing JWT tokens and refresh tokens
pub struct TokenService {
    repository: Arc<dyn TokenRepository>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for persistence
    /// * `config` - Token service configuration
    pub fn new(repository: Arc<dyn TokenRepository>, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    fn access_lifetime(&self) -> Duration {
        Duration::minutes(self.config.access_token_expiry_minutes)
    }

    fn refresh_lifetime(&self) -> Duration {
        Duration::days(self.config.refresh_token_expiry_days)
    }

    /// Issues an access token and a refresh token starting a new family
    pub async fn generate_tokens(&self, user: &User, session_id: Uuid) -> Result<TokenPair, DomainError> {
        let access_token = self.generate_access_token(user, session_id)?;
        let refresh_token = self
            .store_refresh_token(user.id, session_id, None)
            .await?;
        Ok(self.pair(access_token, refresh_token))
    }

    fn pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.access_lifetime().num_seconds(),
            refresh_expires_in: self.refresh_lifetime().num_seconds(),
        }
    }

    fn generate_access_token(&self, user: &User, session_id: Uuid) -> Result<String, DomainError> {
        let claims = Claims::new_access_token(
            user.id,
            session_id,
            user.email.clone(),
            user.is_verified,
            self.access_lifetime(),
            &self.config.issuer,
            &self.config.audience,
        );
        self.encode_jwt(&claims)
    }

    /// Creates a random refresh token and stores its hash
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        token_family: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let token_string: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REFRESH_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let token_hash = Self::hash_token(&token_string);
        let refresh_token = match token_family {
            Some(family) => RefreshToken::in_family(
                user_id,
                session_id,
                token_hash,
                family,
                self.refresh_lifetime(),
            ),
            None => RefreshToken::new(user_id, session_id, token_hash, self.refresh_lifetime()),
        };

        self.repository
            .save_refresh_token(refresh_token)
            .await
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok(token_string)
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Decodes and validates a JWT without consulting the blacklist
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                    ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience | ErrorKind::Json(_) => {
                        TokenError::InvalidClaims
                    }
                    _ => TokenError::InvalidTokenFormat,
                };
                DomainError::Token(error)
            })
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The decoded claims if valid
    /// * `Err(TokenError)` - Token is invalid, expired, malformed or blacklisted
    pub async fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = self.decode_access_token(token)?;

        if self.repository.is_jti_blacklisted(&claims.jti).await? {
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        Ok(claims)
    }

    /// Looks up a refresh token, checking expiry and revocation.
    ///
    /// A revoked token being presented again means it leaked; the whole
    /// family is revoked.
    async fn find_usable_refresh_token(&self, token: &str) -> Result<RefreshToken, DomainError> {
        let stored = self
            .repository
            .find_refresh_token(&Self::hash_token(token))
            .await?
            .ok_or(DomainError::Token(TokenError::TokenNotFound))?;

        if stored.is_revoked {
            let revoked = self.repository.revoke_family(stored.token_family).await?;
            tracing::warn!(
                user_id = %stored.user_id,
                token_family = %stored.token_family,
                revoked,
                event = "refresh_token_reuse",
                "Revoked refresh token presented again, family revoked"
            );
            return Err(DomainError::Token(TokenError::TokenReuseDetected));
        }

        if stored.is_expired() {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        Ok(stored)
    }

    /// Returns the stored record of a usable refresh token
    pub async fn inspect_refresh_token(&self, token: &str) -> Result<RefreshToken, DomainError> {
        self.find_usable_refresh_token(token).await
    }

    /// Refreshes tokens using a refresh token (with rotation)
    ///
    /// The presented token is revoked and the new one joins its family.
    /// `user` must be the owner of the token, freshly loaded so the new
    /// access token carries current claims.
    pub async fn refresh_tokens(&self, refresh_token: &str, user: &User) -> Result<TokenPair, DomainError> {
        let old_token = self.find_usable_refresh_token(refresh_token).await?;
        if old_token.user_id != user.id {
            return Err(DomainError::Token(TokenError::InvalidClaims));
        }

        self.repository.revoke_token(old_token.id).await?;

        let access_token = self.generate_access_token(user, old_token.session_id)?;
        let new_refresh_token = self
            .store_refresh_token(user.id, old_token.session_id, Some(old_token.token_family))
            .await?;

        Ok(self.pair(access_token, new_refresh_token))
    }

    /// Revokes a single refresh token; unknown tokens are ignored
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<(), DomainError> {
        if let Some(stored) = self
            .repository
            .find_refresh_token(&Self::hash_token(token))
            .await?
        {
            if !stored.is_revoked {
                self.repository.revoke_token(stored.id).await?;
            }
        }
        Ok(())
    }

    /// Blacklists an access token until its natural expiry
    pub async fn blacklist_access_token(&self, claims: &Claims) -> Result<(), DomainError> {
        self.repository
            .blacklist_jti(&claims.jti, claims.expires_at())
            .await
    }

    /// Revokes all refresh tokens for a user
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.repository.revoke_all_user_tokens(user_id).await
    }

    /// Revokes the refresh tokens of one session
    pub async fn revoke_for_session(&self, session_id: Uuid) -> Result<u64, DomainError> {
        self.repository.revoke_session_tokens(session_id).await
    }

    /// Deletes expired refresh tokens and blacklist entries
    pub async fn cleanup_expired(&self) -> Result<u64, DomainError> {
        self.repository.delete_expired().await
    }

    /// Hashes a token using SHA-256, hex encoded
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}
