/// Access Guard middleware
///
/// Verifies the access token carried in the `Authorization` header and
/// injects the caller's `IdentityContext` into request extensions for use by
/// route handlers. Nothing downstream runs on failure.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{IdentityContext, TokenCodec};
use crate::error::{AppError, AuthError};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// JWT middleware for protecting routes
///
/// Wraps the protected scope; public routes are registered outside it.
pub struct JwtMiddleware {
    codec: TokenCodec,
}

impl JwtMiddleware {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    codec: TokenCodec,
}

/// Token from the header value, with or without a `Bearer ` prefix
fn extract_token(header_value: &str) -> Option<&str> {
    let value = header_value.trim_start();
    let token = match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim(),
        _ => value.trim_end(),
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        let token = req
            .headers()
            .get(AUTHORIZATION_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_token)
            .map(str::to_string);

        let verified = match token {
            None => Err(AuthError::MissingToken),
            Some(token) => self.codec.verify(&token),
        };

        match verified {
            Ok(claims) => {
                let identity = IdentityContext::from(claims);
                tracing::debug!(
                    uid = %identity.uid,
                    user_type = %identity.user_type,
                    path = %req.path(),
                    "Access token verified"
                );
                req.extensions_mut().insert(identity);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), reason = %e, "Request rejected by access guard");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}
