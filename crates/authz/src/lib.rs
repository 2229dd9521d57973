//! Identity tokens, the authorization gate, and the ownership guard.
//!
//! Request flow: `Authorization` header → [`AuthGate::authorize`] →
//! [`Identity`] → [`ensure_owner`] inside the services.

pub mod gate;
pub mod ownership;
pub mod token;

pub use gate::{AuthGate, GateError};
pub use ownership::{ensure_owner, Identity, NotOwner};
pub use token::{Claims, TokenError, TokenService};
