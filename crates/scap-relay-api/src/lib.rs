//! HTTP surface for the scap-relay service.
//!
//! Routing and identity plumbing only: every route is a thin adapter
//! from request parameters onto the core operations. Client-certificate
//! verification happens in the fronting TLS terminator; this layer reads
//! the identity it passes down.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;
