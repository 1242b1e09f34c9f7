use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput, TokenPair, TokenWithExpiry};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Role assigned to self-registered accounts.
const DEFAULT_ROLE: &str = "user";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

/// Decode and verify a token issued by this service.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password and issue a token pair.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(&input.name, &input.email, &hash, DEFAULT_ROLE)
            .await?;
        let tokens = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { user, tokens })
    }

    /// Authenticate a user and issue a token pair. Unknown email and wrong
    /// password are indistinguishable to the caller.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let hash = self
            .repo
            .get_password_hash(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::Unauthorized);
        }

        let tokens = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, tokens })
    }

    /// Rotate a refresh token: the stored row must exist and be unexpired,
    /// the JWT must verify, and the old row is deleted before a new pair is
    /// issued.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let stored = self
            .repo
            .find_valid_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        decode_token(&self.cfg.jwt_secret, refresh_token).map_err(|_| AuthError::Unauthorized)?;

        let user = self
            .repo
            .find_user_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.repo.delete_refresh_token(stored.id).await?;
        let tokens = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, "refresh_token_rotated");
        Ok(tokens)
    }

    /// Sign an access/refresh pair and persist the refresh token.
    async fn issue_tokens(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_expires = now + Duration::minutes(self.cfg.access_ttl_minutes);
        let refresh_expires = now + Duration::days(self.cfg.refresh_ttl_days);

        let access = self.sign(user, now.timestamp(), access_expires.timestamp())?;
        let refresh = self.sign(user, now.timestamp(), refresh_expires.timestamp())?;

        self.repo
            .save_refresh_token(user.id, &refresh, refresh_expires)
            .await?;

        Ok(TokenPair {
            access: TokenWithExpiry { token: access, expires: access_expires },
            refresh: TokenWithExpiry { token: refresh, expires: refresh_expires },
        })
    }

    fn sign(&self, user: &AuthUser, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: iat as usize,
            exp: exp as usize,
        };
        encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig {
                jwt_secret: "unit-test-secret".into(),
                access_ttl_minutes: 30,
                refresh_ttl_days: 30,
            },
        )
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "S3curePass!".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = svc();
        let session = svc.register(register_input()).await.unwrap();
        assert_eq!(session.user.email, "asha@example.com");
        assert_eq!(session.user.role, "user");

        let login = svc
            .login(LoginInput { email: "asha@example.com".into(), password: "S3curePass!".into() })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);

        let claims = decode_token("unit-test-secret", &login.tokens.access.token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let svc = svc();
        svc.register(register_input()).await.unwrap();
        let err = svc.register(register_input()).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = svc();
        let mut input = register_input();
        input.password = "short".into();
        assert!(matches!(svc.register(input).await.unwrap_err(), AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = svc();
        svc.register(register_input()).await.unwrap();
        let err = svc
            .login(LoginInput { email: "asha@example.com".into(), password: "nope-nope".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_rotates_the_stored_token() {
        let svc = svc();
        let session = svc.register(register_input()).await.unwrap();
        let original = session.tokens.refresh.token.clone();

        let rotated = svc.refresh(&original).await.unwrap();
        assert_ne!(rotated.refresh.token, original);

        // The old token row is gone, so a replayed refresh fails
        let err = svc.refresh(&original).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        // The rotated token still works
        svc.refresh(&rotated.refresh.token).await.unwrap();
    }

    #[tokio::test]
    async fn garbage_refresh_token_is_unauthorized() {
        let svc = svc();
        svc.register(register_input()).await.unwrap();
        let err = svc.refresh("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }
}
