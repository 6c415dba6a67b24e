use actix_web::{
    Error, HttpMessage, HttpResponse, Result,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
    sync::Arc,
};
use uuid::Uuid;

use crate::cookie::{SESSION_COOKIE, SessionCookie};
use crate::session::{FlashKind, SessionStore};

/// Per-request session identity placed in request extensions by
/// [`SessionMiddleware`].
#[derive(Debug, Clone, Copy)]
pub struct SessionHandle {
    /// Identifier of the (persisted) session for this request.
    pub session_id: Uuid,
    /// Logged-in user bound to the session, if any.
    pub user_id: Option<Uuid>,
}

/// Middleware that establishes a session for every request: it verifies the
/// signed session cookie, loads the session row (creating a fresh one when
/// the cookie is missing, invalid, or expired), and exposes a
/// [`SessionHandle`] to handlers. A newly created session sets the cookie on
/// the outgoing response.
pub struct SessionMiddleware {
    store: Arc<dyn SessionStore>,
    codec: SessionCookie,
}

impl SessionMiddleware {
    /// Creates the middleware over a session store and cookie codec.
    pub fn new(store: Arc<dyn SessionStore>, codec: SessionCookie) -> Self {
        Self { store, codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            codec: self.codec.clone(),
        }))
    }
}

/// Service that implements the session middleware logic
pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn SessionStore>,
    codec: SessionCookie,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let codec = self.codec.clone();

        Box::pin(async move {
            // Resolve the session named by the cookie, if it still exists.
            let existing = match req.cookie(SESSION_COOKIE) {
                Some(cookie) => match codec.verify(cookie.value()) {
                    Ok(session_id) => store
                        .get(&session_id)
                        .await
                        .map_err(actix_web::error::ErrorInternalServerError)?,
                    Err(_) => None,
                },
                None => None,
            };

            let (session, is_new) = match existing {
                Some(session) => (session, false),
                None => {
                    let session = store
                        .create()
                        .await
                        .map_err(actix_web::error::ErrorInternalServerError)?;
                    (session, true)
                }
            };

            req.extensions_mut().insert(SessionHandle {
                session_id: session.id,
                user_id: session.user_id,
            });

            let mut res = service.call(req).await?;

            if is_new {
                let cookie = codec
                    .build_cookie(&session.id)
                    .map_err(actix_web::error::ErrorInternalServerError)?;
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    log::warn!("Failed to attach session cookie: {}", e);
                }
            }

            Ok(res)
        })
    }
}

/// Explicit per-request context: always available, regardless of login state.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    /// Session identifier for this request.
    pub session_id: Uuid,
    /// Current user, if logged in.
    pub user_id: Option<Uuid>,
}

impl actix_web::FromRequest for PageContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let handle = req.extensions().get::<SessionHandle>().copied();

        ready(match handle {
            Some(handle) => Ok(PageContext {
                session_id: handle.session_id,
                user_id: handle.user_id,
            }),
            None => Err(actix_web::error::ErrorInternalServerError(
                "Session middleware not installed",
            )),
        })
    }
}

/// Error produced when a login-only page is hit anonymously. Responds with a
/// redirect to the login form.
#[derive(Debug, thiserror::Error)]
#[error("You must be signed in first")]
pub struct NotLoggedIn;

impl actix_web::ResponseError for NotLoggedIn {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish()
    }
}

/// Extractor for handlers that require a logged-in user. An anonymous request
/// gets an error flash and a redirect to `/login`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    /// Session identifier for this request.
    pub session_id: Uuid,
    /// Identifier of the logged-in user.
    pub user_id: Uuid,
}

impl actix_web::FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let handle = req.extensions().get::<SessionHandle>().copied();
        let store = req
            .app_data::<web::Data<dyn SessionStore>>()
            .map(|data| data.clone().into_inner());

        Box::pin(async move {
            let handle = handle.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Session middleware not installed")
            })?;

            match handle.user_id {
                Some(user_id) => Ok(CurrentUser {
                    session_id: handle.session_id,
                    user_id,
                }),
                None => {
                    if let Some(store) = store {
                        if let Err(e) = store
                            .push_flash(
                                &handle.session_id,
                                FlashKind::Error,
                                "You must be signed in first!",
                            )
                            .await
                        {
                            log::warn!("Failed to flash login prompt: {}", e);
                        }
                    }
                    Err(NotLoggedIn.into())
                }
            }
        })
    }
}
