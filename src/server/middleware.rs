//! Session resolution and route protection

use super::state::AppState;
use crate::core::auth::{AuthContext, RouteDecision, route_decision};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Value of cookie `name` from the request's `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Resolve the caller's session and apply the route policy
///
/// The resolved [`AuthContext`] is inserted into request extensions for
/// downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = cookie_value(request.headers(), &state.auth.session_cookie);
    let context = match state.sessions.context_for(token) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve session");
            AuthContext::Anonymous
        }
    };

    let decision = route_decision(request.uri().path(), &context, &state.auth);
    match decision {
        RouteDecision::Allow => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        RouteDecision::Redirect(location) => {
            tracing::debug!(path = request.uri().path(), %location, "route policy redirect");
            Redirect::to(&location).into_response()
        }
    }
}
