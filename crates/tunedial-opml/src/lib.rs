//! tunedial-opml — the navigable lazy tree behind the tunedial TUI.
//!
//! An OPML radio directory is parsed into an arena of outline nodes
//! ([`tree::Tree`]), flattened into a collapse-aware row list, and walked
//! by a cursor/viewport controller ([`nav::Navigator`]). Activating a row
//! runs the per-variant protocol in [`tree::Tree::activate`]: plain
//! branches toggle, link branches lazily fetch their remote sub-document
//! once, and audio leaves resolve a playlist into a player command.

pub mod codec;
pub mod config;
pub mod error;
pub mod favourites;
pub mod fetch;
pub mod nav;
pub mod node;
pub mod platform;
pub mod tree;
