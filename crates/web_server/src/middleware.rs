//! Method-override middleware for HTML forms.
//!
//! Browsers only submit GET and POST, so edit and delete forms POST with a
//! `_method` query parameter naming the verb they mean. This middleware
//! rewrites the request method before routing.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use std::future::{Ready, ready};

/// Rewrites `POST /path?_method=PUT` and `POST /path?_method=DELETE` to the
/// named verb. Other methods and other `_method` values pass through as-is.
pub struct MethodOverride;

impl<S, B> Transform<S, ServiceRequest> for MethodOverride
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MethodOverrideService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MethodOverrideService { service }))
    }
}

/// Service that implements the method rewrite.
pub struct MethodOverrideService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for MethodOverrideService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if req.method() == Method::POST {
            if let Some(method) = override_from_query(req.query_string()) {
                req.head_mut().method = method;
            }
        }
        self.service.call(req)
    }
}

fn override_from_query(query: &str) -> Option<Method> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "_method" {
            return None;
        }
        match value {
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use actix_web::test::{TestRequest, call_service, init_service};
    use actix_web::{App, HttpResponse, http::StatusCode, web};

    use super::*;

    // `use actix_web::test` would shadow the built-in #[test] attribute.
    #[test]
    fn test_override_parsing() {
        assert_eq!(override_from_query("_method=PUT"), Some(Method::PUT));
        assert_eq!(
            override_from_query("foo=1&_method=DELETE"),
            Some(Method::DELETE)
        );
        assert_eq!(override_from_query("_method=PATCH"), None);
        assert_eq!(override_from_query(""), None);
    }

    #[actix_web::test]
    async fn test_post_with_override_hits_the_put_route() {
        let app = init_service(
            App::new().wrap(MethodOverride).route(
                "/thing",
                web::put().to(|| async { HttpResponse::Ok().body("updated") }),
            ),
        )
        .await;

        let req = TestRequest::post()
            .uri("/thing?_method=PUT")
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_get_is_never_rewritten() {
        let app = init_service(
            App::new().wrap(MethodOverride).route(
                "/thing",
                web::delete().to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let req = TestRequest::get()
            .uri("/thing?_method=DELETE")
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
