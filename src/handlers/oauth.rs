// Microsoft Live handlers: sign-in, callback, and failure
use std::collections::HashMap;

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::callback::{CallbackOutcome, MicrosoftLiveStrategy};
use crate::models::CallbackRequest;
use crate::oauth::{LiveProvider, STRATEGY_NAME};
use crate::session::{create_wl_auth_cookie, SessionStore};
use crate::settings::LiveAuthSettings;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;

#[derive(Debug, Deserialize)]
pub struct FailureQuery {
    pub message: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: String,
    pub strategy: String,
}

/// Microsoft Live sign in handler
///
/// Stores a fresh state token in the session and redirects to the provider.
///
/// # Errors
/// Returns an error if the session cookie cannot be created
pub async fn live_sign_in<C: LiveProvider + 'static>(
    req: HttpRequest,
    strategy: web::Data<MicrosoftLiveStrategy<C>>,
    session_store: web::Data<SessionStore>,
) -> Result<HttpResponse> {
    let mut session = session_store.load(&req);

    match strategy.request_phase(&mut session) {
        Ok(auth_url) => {
            let session_cookie = session_store
                .create_cookie(&session)
                .map_err(actix_web::error::ErrorInternalServerError)?;
            info!("Redirecting to {} OAuth: {auth_url}", strategy.name());
            Ok(ResponseBuilder::redirect(&auth_url, vec![session_cookie]))
        }
        Err(e) => {
            error!("Failed to get auth URL for {}: {e}", strategy.name());
            Ok(ResponseBuilder::failure_redirect(e.failure_message(), vec![]))
        }
    }
}

/// Microsoft Live callback handler
///
/// Accepts GET and POST; form values win over query values on conflict.
///
/// # Errors
///
/// Returns an error if the request cookies cannot be parsed
pub async fn live_callback<C: LiveProvider + 'static>(
    query: web::Query<HashMap<String, String>>,
    form: Option<web::Form<HashMap<String, String>>>,
    req: HttpRequest,
    strategy: web::Data<MicrosoftLiveStrategy<C>>,
    session_store: web::Data<SessionStore>,
    settings: web::Data<LiveAuthSettings>,
) -> Result<HttpResponse> {
    let callback_request = build_callback_request(query, form, &req, &session_store)?;
    let param_names: Vec<&String> = callback_request.params.keys().collect();
    LoggingHelper::log_callback_debug(&req, &param_names);

    match strategy.callback_phase(&callback_request).await {
        Ok(CallbackOutcome::Aborted) => Ok(ResponseBuilder::empty_ok()),
        Ok(CallbackOutcome::Failed { message, session }) => Ok(ResponseBuilder::failure_redirect(
            message,
            session_cookies(&session_store, &session),
        )),
        Ok(CallbackOutcome::Authenticated(authenticated)) => {
            let mut cookies = vec![create_wl_auth_cookie(
                authenticated.wl_auth,
                settings.cookies.secure,
                settings.cookies.wl_auth_domain.as_deref(),
            )];
            cookies.extend(session_cookies(&session_store, &authenticated.session));
            Ok(ResponseBuilder::json_with_cookies(&authenticated.auth, cookies))
        }
        Err(e) => {
            let message = e.failure_message();
            LoggingHelper::log_callback_failure(strategy.name(), message, &e.to_string());
            Ok(ResponseBuilder::failure_redirect(message, vec![]))
        }
    }
}

/// Failure endpoint reached through the failure redirect
///
/// # Errors
/// Never fails; the signature matches the other handlers
pub async fn auth_failure(query: web::Query<FailureQuery>) -> Result<HttpResponse> {
    let query = query.into_inner();
    Ok(HttpResponse::Unauthorized().json(FailureResponse {
        error: query.message.unwrap_or_else(|| "unknown_error".to_string()),
        strategy: query.strategy.unwrap_or_else(|| STRATEGY_NAME.to_string()),
    }))
}

fn build_callback_request(
    query: web::Query<HashMap<String, String>>,
    form: Option<web::Form<HashMap<String, String>>>,
    req: &HttpRequest,
    session_store: &SessionStore,
) -> Result<CallbackRequest> {
    let mut params = query.into_inner();
    if let Some(form) = form {
        params.extend(form.into_inner());
    }

    let cookies = req
        .cookies()
        .map_err(actix_web::error::ErrorBadRequest)?
        .iter()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect();

    Ok(CallbackRequest {
        params,
        cookies,
        session: session_store.load(req),
    })
}

fn session_cookies(
    session_store: &SessionStore,
    session: &HashMap<String, String>,
) -> Vec<Cookie<'static>> {
    match session_store.create_cookie(session) {
        Ok(cookie) => vec![cookie],
        Err(e) => {
            error!("Failed to create session cookie: {e}");
            vec![session_store.create_expired_cookie()]
        }
    }
}
