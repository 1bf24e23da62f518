use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::domain::Role;

/// Identity of the caller for the lifetime of one request.
///
/// Inserted into the request extensions by `JwtMiddleware` after the token
/// verified; handlers receive it as `web::ReqData<IdentityContext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityContext {
    pub email: String,
    pub name: String,
    pub username: String,
    pub uid: String,
    pub user_type: Role,
}

impl IdentityContext {
    /// Account id as a UUID, if the subject is one
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.uid).ok()
    }
}

impl From<Claims> for IdentityContext {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            name: claims.name,
            username: claims.username,
            uid: claims.uid,
            user_type: claims.user_type,
        }
    }
}
