//! Playlist module: the ordered track store and helpers that turn paths
//! given by the user into tracks.
//!
//! `Playlist` lives in `playlist::store`, `Track` in `playlist::model` and the
//! directory walker in `playlist::collect`.

mod collect;
mod model;
mod store;

pub use collect::collect_media;
pub use model::Track;
pub use store::Playlist;
