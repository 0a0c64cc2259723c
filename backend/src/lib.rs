//! Obstacle registry backend library.
//!
//! Pilots report map obstacles, registrars triage them, and rejected reports
//! move into an archive that keeps their comment history.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
