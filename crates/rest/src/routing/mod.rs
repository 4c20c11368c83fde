//! Route configuration for the wiki REST API.
//!
//! This module contains the routing configuration that maps HTTP paths
//! to handlers.

pub mod wiki_routes;

pub use wiki_routes::create_routes;
