//! Sign-in outcome mapping

use crate::config::AuthConfig;
use crate::core::auth::{AuthErrorKind, IdentityProvider, Session, SignInError, SignInMethod};
use crate::core::validation::FormData;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

/// Form field carrying the post-sign-in destination
pub const REDIRECT_TO: &str = "redirectTo";

/// Result of a sign-in attempt the user can act on
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn { session: Session, redirect_to: String },
    /// Message to show on the sign-in form
    Failed(String),
}

/// Sign in with credentials and classify the result
///
/// `CredentialsSignin` failures read "Invalid credentials.", every other
/// classified failure reads "Something went wrong.". Unclassified failures
/// come back as `Err`, unchanged.
pub async fn authenticate(
    provider: &dyn IdentityProvider,
    form: &FormData,
    config: &AuthConfig,
) -> anyhow::Result<AuthOutcome> {
    match provider.sign_in(SignInMethod::Credentials, form).await {
        Ok(session) => Ok(AuthOutcome::SignedIn {
            session,
            redirect_to: redirect_target(form, config),
        }),
        Err(SignInError::Auth(e)) => {
            let message = match e.kind {
                AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS,
                _ => SOMETHING_WENT_WRONG,
            };
            tracing::debug!(kind = %e.kind, "sign-in rejected");
            Ok(AuthOutcome::Failed(message.to_string()))
        }
        Err(SignInError::Other(e)) => Err(e),
    }
}

/// Local paths only; anything else falls back to the home page
fn redirect_target(form: &FormData, config: &AuthConfig) -> String {
    form.get(REDIRECT_TO)
        .map(|target| target.trim())
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .map(str::to_string)
        .unwrap_or_else(|| config.home_page.clone())
}
