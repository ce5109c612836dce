//! Sign-in gate. Verification is delegated to the identity provider; this
//! module only translates its verdict into a message for the form.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use dashboard_core::FormData;
use dashboard_identity::{AuthErrorKind, Credentials, IdentityClient, IdentityError};
use metrics::counter;
use tracing::{error, info};

use crate::problem::ProblemResponse;
use crate::router::AppState;
use crate::views;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

/// Verifies `credentials`.
///
/// Returns `Ok(None)` on success and `Ok(Some(message))` when the provider
/// rejected the sign-in. Failures that are not a sign-in rejection are
/// returned unchanged.
pub async fn authenticate(
    client: &IdentityClient,
    credentials: &Credentials,
) -> Result<Option<&'static str>, IdentityError> {
    match client.verify_credentials(credentials).await {
        Ok(_) => Ok(None),
        Err(IdentityError::Auth(auth)) => Ok(Some(match auth.kind {
            AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS,
            AuthErrorKind::Other(_) => SOMETHING_WENT_WRONG,
        })),
        Err(other) => Err(other),
    }
}

pub async fn login_form() -> Html<String> {
    Html(views::login::page("", None))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<FormData>,
) -> Result<Response, ProblemResponse> {
    let credentials = Credentials {
        email: form.get("email").unwrap_or_default().trim().to_string(),
        password: form.get("password").unwrap_or_default().to_string(),
    };

    match authenticate(state.identity(), &credentials).await {
        Ok(None) => {
            counter!("auth_attempts_total", "outcome" => "success").increment(1);
            info!(stage = "auth", email = %credentials.email, "sign-in accepted");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Ok(Some(message)) => {
            counter!("auth_attempts_total", "outcome" => "rejected").increment(1);
            info!(stage = "auth", email = %credentials.email, %message, "sign-in rejected");
            let html = views::login::page(&credentials.email, Some(message));
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
        Err(err) => {
            counter!("auth_attempts_total", "outcome" => "error").increment(1);
            error!(stage = "auth", error = %err, "identity provider call failed");
            Err(ProblemResponse::bad_gateway(
                "identity_provider_error",
                err.to_string(),
            ))
        }
    }
}
