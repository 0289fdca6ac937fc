//! Google Analytics plugin for vendor-neutral analytics hosts.
//!
//! See [`analytics`] for the dispatcher, custom dimension mapping and host plugin surface, and
//! [`logger`] for controlling the crate's diagnostics.

pub mod analytics;
pub mod logger;
