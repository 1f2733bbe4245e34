//! API key middleware for Actix Web.
//!
//! # Spring Equivalent
//! `SecurityFilterChain` / `FilterChainProxy`

use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::http::security::api_key::{ApiKeyListener, Outcome};
use crate::http::security::context::SecurityContext;

/// API key middleware factory.
///
/// # Spring Equivalent
/// `SecurityFilterChain`
///
/// Runs the listener on every request and stores the resulting
/// [`SecurityContext`] in the request extensions. Rejected requests get the
/// challenge response and never reach the handler. Fatal authentication
/// errors are returned as the service error.
///
/// # Example
/// ```ignore
/// let listener = ApiKeyConfig::new("api")
///     .header_token("Token")
///     .build_listener(Arc::new(users))?;
///
/// App::new().wrap(ApiKeyTransform::new(listener))
/// ```
#[derive(Clone)]
pub struct ApiKeyTransform {
    listener: Rc<ApiKeyListener>,
}

impl ApiKeyTransform {
    pub fn new(listener: ApiKeyListener) -> Self {
        ApiKeyTransform {
            listener: Rc::new(listener),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyTransform
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyService {
            listener: Rc::clone(&self.listener),
            service: Rc::new(service),
        })
    }
}

/// API key middleware service.
///
/// # Spring Equivalent
/// `FilterChainProxy`
pub struct ApiKeyService<S> {
    listener: Rc<ApiKeyListener>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        // Step 1: Start from the context an outer layer may have installed
        let mut ctx = req
            .extensions_mut()
            .remove::<SecurityContext>()
            .unwrap_or_default();

        // Step 2: Authenticate
        let outcome = self.listener.handle(req.request(), &mut ctx);

        // Step 3: Store the context for the extractors, whatever the outcome
        req.extensions_mut().insert(ctx);

        match outcome {
            Ok(Outcome::Rejected(response)) => {
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
            Ok(Outcome::Unattempted | Outcome::Authenticated) => {
                let fut = service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}
