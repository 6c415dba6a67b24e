//! The `render(view, data)` collaborator: a Tera singleton over templates
//! embedded at compile time.

use actix_web::HttpResponse;
use auth_services::session::Flash;
use lazy_static::lazy_static;
use tera::{Context, Tera};

use crate::error::PageError;

lazy_static! {
    static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layout", include_str!("../templates/layout.html")),
            ("home", include_str!("../templates/home.html")),
            ("error", include_str!("../templates/error.html")),
            ("campgrounds/index", include_str!("../templates/campgrounds/index.html")),
            ("campgrounds/show", include_str!("../templates/campgrounds/show.html")),
            ("campgrounds/new", include_str!("../templates/campgrounds/new.html")),
            ("campgrounds/edit", include_str!("../templates/campgrounds/edit.html")),
            ("users/register", include_str!("../templates/users/register.html")),
            ("users/login", include_str!("../templates/users/login.html")),
        ])
        .expect("embedded templates parse");
        tera
    };
}

/// Builds the context every page starts from: flash banners and login state.
pub fn base_context(flash: &Flash, logged_in: bool) -> Context {
    let mut context = Context::new();
    context.insert("flash_success", &flash.success);
    context.insert("flash_error", &flash.error);
    context.insert("logged_in", &logged_in);
    context
}

/// Renders a view to an HTML string.
pub fn render(view: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(view, context)
}

/// Renders a view into a 200 HTML response.
pub fn page(view: &str, context: &Context) -> Result<HttpResponse, PageError> {
    let body = render(view, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Renders the error view. Used by the terminal error responder, which falls
/// back to plain text if this fails too.
pub fn render_error(status: u16, message: &str) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("status", &status);
    context.insert("message", message);
    context.insert("flash_success", &None::<String>);
    context.insert("flash_error", &None::<String>);
    context.insert("logged_in", &false);
    render("error", &context)
}

/// A 303 redirect to the given location.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}
