//! Sign-in and sign-out

use crate::actions::{AuthOutcome, authenticate};
use crate::actions::auth::REDIRECT_TO;
use crate::core::error::DashboardResult;
use crate::core::validation::FormData;
use crate::server::middleware::cookie_value;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// What the sign-in form needs to render
#[derive(Debug, Serialize)]
pub struct LoginView {
    /// Field name the form posts the destination under
    pub redirect_field: &'static str,
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
}

#[derive(Debug, Serialize)]
pub struct LoginFailure {
    pub message: String,
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Json<LoginView> {
    Json(LoginView {
        redirect_field: REDIRECT_TO,
        callback_url: query
            .callback_url
            .unwrap_or_else(|| state.auth.home_page.clone()),
    })
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<FormData>,
) -> DashboardResult<Response> {
    match authenticate(&*state.identity, &form, &state.auth).await? {
        AuthOutcome::SignedIn {
            session,
            redirect_to,
        } => {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                state.auth.session_cookie,
                session.token,
                state.auth.session_ttl_minutes * 60
            );
            Ok(with_cookie(Redirect::to(&redirect_to), &cookie))
        }
        AuthOutcome::Failed(message) => {
            Ok((StatusCode::UNAUTHORIZED, Json(LoginFailure { message })).into_response())
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> DashboardResult<Response> {
    let token = cookie_value(&headers, &state.auth.session_cookie)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    if let Some(token) = token {
        state.identity.sign_out(&token).await?;
    }

    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        state.auth.session_cookie
    );
    Ok(with_cookie(Redirect::to("/"), &cookie))
}

fn with_cookie(response: impl IntoResponse, cookie: &str) -> Response {
    let mut response = response.into_response();
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "invalid session cookie header"),
    }
    response
}
