//! Built-in site adapters.
//!
//! Each module provides an `adapter()` constructor returning the
//! [`crate::adapter::SiteAdapter`] for one retail site. Selectors track the
//! live markup at the time of writing; when a site changes its layout,
//! override the adapter in config rather than editing extraction code.

pub mod amazon;
pub mod croma;
pub mod flipkart;
pub mod snapdeal;
