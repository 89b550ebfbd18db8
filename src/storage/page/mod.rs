//! Page images.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB in-memory image of one block

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
