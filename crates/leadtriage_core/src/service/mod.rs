//! Application-level services consumed by the presentation layer.
//!
//! # Responsibility
//! - Own the lead/opportunity state containers and the edit session.
//! - Expose the load, save, convert and view entry points.

pub mod console;
