//! Settings schema and loader.
//!
//! Settings come from struct defaults, an optional TOML file and
//! `MEDIADECK__*` environment overrides, in increasing precedence.

mod load;
mod schema;

pub use schema::*;
