//! Session authorization
//!
//! A page load is authorized by a bearer token: taken from the page URL
//! when present, otherwise from a persisted store, and submitted to a
//! remote verification service. Every uncertain outcome (missing token,
//! verifier rejection, transport failure, timeout) resolves to `Denied` —
//! the gate fails closed.
//!
//! Storage and verification are capability traits so the state machine is
//! testable with in-memory fakes.

mod error;
mod gate;
mod store;
mod verifier;

pub use error::{AuthError, AuthResult};
pub use gate::{AuthorizationState, SessionGate};
pub use store::{JsonFileTokenStore, MemoryTokenStore, TokenStore};
pub use verifier::{RemoteTokenVerifier, TokenVerifier};
