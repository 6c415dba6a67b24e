use actix_web::{HttpResponse, web};

use crate::error::PageError;
use crate::{auth_handlers, listing_handlers, review_handlers};

/// Wildcard handler: anything unmatched is a 400 "Page Not Found!" funneled
/// through the terminal error responder.
pub async fn not_found() -> Result<HttpResponse, PageError> {
    Err(PageError::RouteNotFound)
}

/// Registers every page route. Shared by the server binary and the handler
/// tests so both exercise the same table.
pub fn pages(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(listing_handlers::home))
        .service(
            web::scope("/campgrounds")
                .route("", web::get().to(listing_handlers::index))
                .route("", web::post().to(listing_handlers::create))
                .route("/new", web::get().to(listing_handlers::new_form))
                .route("/{id}", web::get().to(listing_handlers::show))
                .route("/{id}", web::put().to(listing_handlers::update))
                .route("/{id}", web::delete().to(listing_handlers::delete))
                .route("/{id}/edit", web::get().to(listing_handlers::edit_form))
                .route("/{id}/reviews", web::post().to(review_handlers::create_review))
                .route(
                    "/{id}/reviews/{review_id}",
                    web::delete().to(review_handlers::delete_review),
                ),
        )
        .route("/register", web::get().to(auth_handlers::register_form))
        .route("/register", web::post().to(auth_handlers::register))
        .route("/login", web::get().to(auth_handlers::login_form))
        .route("/login", web::post().to(auth_handlers::login))
        .route("/logout", web::post().to(auth_handlers::logout))
        .default_service(web::route().to(not_found));
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use crate::test_support::{TestWorld, spawn_app};

    #[actix_web::test]
    async fn test_wildcard_route_is_a_400_page_not_found() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);

        let req = test::TestRequest::get()
            .uri("/no/such/page")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert!(body.contains("Page Not Found!"));
    }

    #[actix_web::test]
    async fn test_fresh_visit_sets_the_session_cookie() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);

        let req = test::TestRequest::get().uri("/campgrounds").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let set_cookie = res
            .headers()
            .get("set-cookie")
            .expect("fresh visit sets a session cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("trailside.sid="));
        assert!(set_cookie.contains("HttpOnly"));
    }
}
