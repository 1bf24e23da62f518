/// Authentication module
///
/// Token issuance/verification, password hashing, the identity context
/// handed to handlers, authorization checks and token pair bookkeeping.

mod claims;
mod context;
mod guard;
mod jwt;
mod password;
mod token_store;

pub use claims::{Claims, Expiring, RefreshClaims};
pub use context::IdentityContext;
pub use guard::{has_role, is_self_or_admin, require_role, require_self_or_admin};
pub use jwt::TokenCodec;
pub use password::CredentialHasher;
pub use token_store::persist_token_pair;
