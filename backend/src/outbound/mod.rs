//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **media**: recipe pictures on the local filesystem
//! - **document**: shopping-list text and PDF exporters
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod document;
pub mod media;
pub mod persistence;
