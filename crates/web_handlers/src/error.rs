use actix_web::{HttpResponse, http::StatusCode};
use auth_services::session::SessionError;
use auth_services::types::AuthError;
use image_store::ImageStoreError;
use listings::StoreError;

use crate::views;

/// Failure of any page handler. Every handler returns
/// `Result<HttpResponse, PageError>` and propagates with `?`, so all failures
/// funnel into the single [`actix_web::ResponseError`] implementation below.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No route matched the request path
    #[error("Page Not Found!")]
    RouteNotFound,

    /// A submitted form failed validation
    #[error("{0}")]
    Validation(String),

    /// The multipart request body could not be read
    #[error("Invalid upload: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    /// The persistence layer failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session store failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An account operation failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The image host failed
    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),

    /// A view failed to render
    #[error("Template error: {0}")]
    Render(#[from] tera::Error),
}

impl actix_web::ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::RouteNotFound
            | PageError::Validation(_)
            | PageError::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Client mistakes get the real message; anything else gets the
        // generic string and the detail goes to the log.
        let message = if status.is_server_error() {
            log::error!("Request failed: {}", self);
            "Something went wrong!".to_string()
        } else {
            self.to_string()
        };

        let body = views::render_error(status.as_u16(), &message)
            .unwrap_or_else(|_| format!("{} {}", status.as_u16(), message));

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::body::MessageBody;

    fn body_of(response: HttpResponse) -> String {
        let bytes = response.into_body().try_into_bytes().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_route_not_found_is_400_with_message() {
        let error = PageError::RouteNotFound;
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(response).contains("Page Not Found!"));
    }

    #[test]
    fn test_store_failure_defaults_to_500_with_generic_message() {
        let error = PageError::Store(StoreError::Database(sqlx::Error::PoolClosed));

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response);
        assert!(body.contains("Something went wrong!"));
        // The database detail never reaches the page.
        assert!(!body.contains("PoolClosed"));
    }

    #[test]
    fn test_validation_message_is_surfaced() {
        let error = PageError::Validation("Price must be a number".to_string());

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(response).contains("Price must be a number"));
    }
}
