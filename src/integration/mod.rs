//! Integration tests
//!
//! Exercise the loader, builder, serializer and reload paths together on
//! realistic playlists.

mod e2e;
mod fixtures;
