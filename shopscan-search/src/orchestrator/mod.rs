//! Search orchestrator: concurrent per-site fetch and extraction.
//!
//! This module fans a product query out to every selected site
//! concurrently, isolates per-site failures into error records, and
//! returns one record per site in registry order.

pub mod search;
