//! # ripcap core
//!
//! Core crate of ripcap: decodes GPU draw-call capture files and
//! reconstructs renderable mesh geometry from them. Host applications (the
//! batch importer CLI, scene builders) consume [`capture`] and stay free of
//! container and addressing details.

pub mod capture;
pub mod math;

/// Core library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
