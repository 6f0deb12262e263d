use actix_web::{cookie::Cookie, HttpResponse};
use serde::Serialize;

use crate::oauth::STRATEGY_NAME;

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Empty `200` returned when a callback is ignored
    #[must_use]
    pub fn empty_ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    /// Create a redirect response with optional cookies
    #[must_use]
    pub fn redirect(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder.append_header(("Location", location)).finish()
    }

    /// Redirect to the failure endpoint with the given message
    #[must_use]
    pub fn failure_redirect(message: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let location = format!(
            "/auth/failure?message={}&strategy={STRATEGY_NAME}",
            urlencoding::encode(message)
        );
        Self::redirect(&location, cookies)
    }

    /// `200` JSON body with cookies attached
    #[must_use]
    pub fn json_with_cookies<T: Serialize>(body: &T, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder.json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{header, StatusCode};

    #[test]
    fn test_empty_ok() {
        let response = ResponseBuilder::empty_ok();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_failure_redirect_location() {
        let response = ResponseBuilder::failure_redirect("csrf_detected", vec![]);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/failure?message=csrf_detected&strategy=microsoft_live"
        );
    }

    #[test]
    fn test_redirect_sets_cookies() {
        let response = ResponseBuilder::redirect("/next", vec![Cookie::new("a", "b")]);
        assert_eq!(response.cookies().count(), 1);
    }
}
