//! Authentication for the dashboard
//!
//! - [`IdentityProvider`]: the sign-in contract the outcome reporter talks to
//! - [`CredentialsProvider`]: email/password sign-in against the user store
//! - [`SessionStore`]: server-side sessions keyed by an opaque cookie token
//! - [`AuthContext`] and [`route_decision`]: who is calling and where they may go

use crate::config::AuthConfig;
use crate::core::query::encode_query_component;
use crate::core::service::UserService;
use crate::core::validation::{Credentials, FormData};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Authorization context resolved from a request's session cookie
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Signed-in user
    User {
        user_id: Uuid,
        email: String,
        name: String,
    },

    /// No valid session
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User { .. })
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }
}

impl From<&Session> for AuthContext {
    fn from(session: &Session) -> Self {
        AuthContext::User {
            user_id: session.user_id,
            email: session.email.clone(),
            name: session.name.clone(),
        }
    }
}

/// What the route policy wants done with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Redirect to this location (sign-in page or home page)
    Redirect(String),
}

/// Route policy
///
/// - anonymous request under the protected prefix: send to the sign-in page
///   with `callbackUrl` set to the requested path
/// - signed-in request to `/` or the sign-in page: send to the home page
/// - everything else passes
pub fn route_decision(path: &str, context: &AuthContext, config: &AuthConfig) -> RouteDecision {
    let protected = path == config.protected_prefix
        || path.starts_with(&format!("{}/", config.protected_prefix));

    if protected && !context.is_authenticated() {
        return RouteDecision::Redirect(format!(
            "{}?callbackUrl={}",
            config.sign_in_page,
            encode_query_component(path)
        ));
    }

    if context.is_authenticated() && (path == "/" || path == config.sign_in_page) {
        return RouteDecision::Redirect(config.home_page.clone());
    }

    RouteDecision::Allow
}

/// Classification tag of a sign-in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The email/password pair did not match a user
    CredentialsSignin,
    AccessDenied,
    /// The provider failed while checking credentials
    CallbackRouteError,
    Configuration,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialsSignin => "CredentialsSignin",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::CallbackRouteError => "CallbackRouteError",
            AuthErrorKind::Configuration => "Configuration",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified sign-in failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("authentication failed: {kind}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }
}

/// Everything `IdentityProvider::sign_in` can fail with
///
/// `Auth` carries a classification tag; `Other` is anything the provider did
/// not classify and is propagated unchanged by the caller.
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Sign-in methods an identity provider may support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMethod {
    Credentials,
}

/// A server-side session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Opaque cookie value
    pub token: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// In-process session table
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user_id` that lasts `ttl`
    ///
    /// Sessions that have expired without being read again are swept here.
    pub fn create(&self, user_id: Uuid, email: &str, name: &str, ttl: Duration) -> Result<Session> {
        let session = Session {
            token: Uuid::new_v4(),
            user_id,
            email: email.to_string(),
            name: name.to_string(),
            expires_at: Utc::now() + ttl,
        };

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "dropped expired sessions");
        }
        sessions.insert(session.token, session.clone());

        Ok(session)
    }

    /// Look up a live session; expired sessions are dropped on access
    pub fn get(&self, token: &Uuid) -> Result<Option<Session>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match sessions.get(token) {
            Some(session) if session.is_expired() => {
                sessions.remove(token);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    /// Remove a session; returns whether it existed
    pub fn revoke(&self, token: &Uuid) -> Result<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(sessions.remove(token).is_some())
    }

    /// Number of sessions held, live or not yet swept
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a raw cookie value to an auth context
    pub fn context_for(&self, token: Option<&str>) -> Result<AuthContext> {
        let Some(token) = token.and_then(|t| Uuid::parse_str(t).ok()) else {
            return Ok(AuthContext::Anonymous);
        };
        Ok(self
            .get(&token)?
            .map(|session| AuthContext::from(&session))
            .unwrap_or(AuthContext::Anonymous))
    }
}

/// Sign-in contract
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, method: SignInMethod, form: &FormData)
    -> Result<Session, SignInError>;

    /// End a session. Unknown tokens are not an error.
    async fn sign_out(&self, token: &Uuid) -> Result<()>;
}

/// Email/password identity provider backed by the user store
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<dyn UserService>,
    sessions: SessionStore,
    config: AuthConfig,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserService>, sessions: SessionStore, config: AuthConfig) -> Self {
        Self {
            users,
            sessions,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    async fn authorize(&self, form: &FormData) -> Result<Session, SignInError> {
        let credentials = match Credentials::parse(form) {
            Ok(credentials) => credentials,
            Err(errors) => {
                tracing::debug!(?errors, "rejected malformed credentials");
                return Err(AuthError::new(AuthErrorKind::CredentialsSignin).into());
            }
        };

        let user = match self.users.find_by_email(&credentials.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::new(AuthErrorKind::CredentialsSignin).into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch user");
                return Err(AuthError::new(AuthErrorKind::CallbackRouteError).into());
            }
        };

        match bcrypt::verify(&credentials.password, &user.password) {
            Ok(true) => {}
            Ok(false) => return Err(AuthError::new(AuthErrorKind::CredentialsSignin).into()),
            Err(e) => {
                tracing::error!(error = %e, user_id = %user.id, "Failed to verify password hash");
                return Err(AuthError::new(AuthErrorKind::CallbackRouteError).into());
            }
        }

        let session = self.sessions.create(
            user.id,
            &user.email,
            &user.name,
            Duration::minutes(self.config.session_ttl_minutes),
        )?;
        tracing::info!(user_id = %user.id, "user signed in");
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for CredentialsProvider {
    async fn sign_in(
        &self,
        method: SignInMethod,
        form: &FormData,
    ) -> Result<Session, SignInError> {
        match method {
            SignInMethod::Credentials => self.authorize(form).await,
        }
    }

    async fn sign_out(&self, token: &Uuid) -> Result<()> {
        if self.sessions.revoke(token)? {
            tracing::info!(%token, "session revoked");
        }
        Ok(())
    }
}
