//! Foodgram backend library: recipe sharing over a JSON HTTP API.
//!
//! The crate is split into [`domain`] (entities, services and the driven
//! ports they need), [`inbound`] (HTTP handlers) and [`outbound`] (Diesel
//! repositories, image storage and shopping-list renderers).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
