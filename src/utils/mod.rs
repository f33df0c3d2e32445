//! Utility modules for the prerender tool.

pub mod exec;
pub mod path;
pub mod plural;

pub use plural::plural_count;
