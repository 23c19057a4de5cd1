//! Inbound adapters translating external input into domain service calls.
//!
//! [`http`] serves the REST API; [`csv_seed`] reads the catalogue seed files
//! consumed by the `load-data` binary.

pub mod csv_seed;
pub mod http;
