//! Clients for external services the domain layer talks to.
//!
//! Gateways own the HTTP plumbing for third-party APIs so the rest of the
//! domain layer only deals in domain types and domain errors.

pub mod oauth;
