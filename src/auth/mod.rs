//! Authentication gate: token issuing, password hashing and caller identity.

pub mod identity;
pub mod jwt;
pub mod password;

pub use identity::{Identity, require_auth, require_role, resolve_identity};
