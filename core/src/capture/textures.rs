//! Texture-path resolution and material cache keys.
//!
//! A mesh's texture list is recorded as paths relative to its capture file.
//! Resolution anchors them to the capture's directory and drops entries
//! that do not exist on disk, preserving slot order — the first surviving
//! slot binds as base color unless a primary-slot override rotates another
//! one to the front.

use std::path::{Path, PathBuf};

/// Material cache key: the resolved, ordered texture list of a mesh.
///
/// Two meshes whose resolved lists are equal share a material. The key is a
/// typed value and cache lookups answer present/absent — there is no
/// reserved "not found" sentinel that a legitimate path list could collide
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey(Vec<PathBuf>);

impl MaterialKey {
    pub fn new(paths: &[PathBuf]) -> Self {
        Self(paths.to_vec())
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve a mesh's relative texture paths into an ordered list of existing
/// files.
///
/// `directory` is the capture file's directory; without one (in-memory
/// parses) paths resolve as given. `primary_slot` rotates that slot of the
/// surviving list to the front.
pub fn resolve_texture_list(
    directory: Option<&Path>,
    names: &[String],
    primary_slot: usize,
) -> Vec<PathBuf> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let full = match directory {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        if full.is_file() {
            resolved.push(full);
        } else {
            log::warn!("texture not found: {}", full.display());
        }
    }

    if primary_slot > 0 && primary_slot < resolved.len() {
        let primary = resolved.remove(primary_slot);
        resolved.insert(0, primary);
    }
    resolved
}
