//! Kunda booking backend.
//!
//! Hexagonal layout: [`domain`] holds the booking rules and driven ports,
//! [`outbound`] the storage adapters, [`inbound`] the HTTP surface and
//! [`server`] the wiring between them.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
