//! `timberline-auth`: caller identity and authorization guards.
//!
//! Authentication itself happens upstream; this crate only validates already
//! issued tokens and answers "is this caller the owner/assignee?" questions.
//! It is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, ensure_assignee, ensure_owner, ensure_recipient};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::Caller;
pub use roles::{Engagement, Role, RoleKind};
pub use user::UserProfile;
