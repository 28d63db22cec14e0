//! Cross-file mesh deduplication.
//!
//! A capture session emits thousands of near-identical per-frame draw
//! calls; the dedup engine fingerprints each mesh's geometric payload and
//! suppresses re-importing content that was already seen. The engine is the
//! only stateful part of the core: it moves once from Unloaded to Ready and
//! then answers skip queries, accumulating fingerprints as it goes.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::container::{parse_capture, MeshRecord};
use super::options::ImportOptions;

/// Which code path a fingerprint was produced through.
///
/// Primary-stream meshes and extra-UV-stream meshes are distinct dedup
/// namespaces: the same geometry imported through the two paths must not be
/// conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamTag {
    Primary,
    ExtraUv,
}

impl StreamTag {
    fn letter(self) -> char {
        match self {
            Self::Primary => 'p',
            Self::ExtraUv => 'x',
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "p" => Some(Self::Primary),
            "x" => Some(Self::ExtraUv),
            _ => None,
        }
    }
}

/// Key of the fingerprint store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub tag: StreamTag,
    pub fingerprint: u64,
}

/// Where a stored fingerprint was first seen.
#[derive(Debug, Clone)]
enum Origin {
    /// First occurrence within this run.
    Run { path: PathBuf, mesh_index: usize },
    /// Loaded from a persisted fingerprint store.
    Store,
}

/// Content fingerprint of one mesh's geometric payload.
///
/// Hashes the primary stream's stride, vertex count and raw vertex bytes
/// plus the index-buffer bytes — never textures. Raw bytes rather than
/// resolved positions keep the fingerprint independent of addressing
/// options, so Auto and explicit-address runs agree on duplicates.
pub fn fingerprint_mesh(mesh: &MeshRecord) -> u64 {
    let mut hasher = DefaultHasher::new();
    if let Some(stream) = mesh.stream(0) {
        stream.table().stride().hash(&mut hasher);
        stream.vertex_count().hash(&mut hasher);
        stream.data().hash(&mut hasher);
    }
    mesh.indices().index_count().hash(&mut hasher);
    mesh.indices().data().hash(&mut hasher);
    hasher.finish()
}

/// Duplicate-suppression engine for one import batch.
///
/// Lifecycle: [`DedupEngine::new`] (Unloaded) → [`DedupEngine::load_hashes`]
/// (Ready) → any number of [`DedupEngine::should_skip`] queries. The engine
/// never transitions back. Lookups may run concurrently; inserts take the
/// write lock and first-to-insert wins.
pub struct DedupEngine {
    ready: bool,
    tag: StreamTag,
    /// Fingerprints precomputed per (path, mesh index) during load.
    fingerprints: HashMap<(PathBuf, usize), u64>,
    store: RwLock<HashMap<DedupKey, Origin>>,
}

impl DedupEngine {
    pub fn new() -> Self {
        Self {
            ready: false,
            tag: StreamTag::Primary,
            fingerprints: HashMap::new(),
            store: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Pre-scan the batch: parse every input and fingerprint every mesh.
    ///
    /// Files that fail to parse are logged and skipped — they will fail the
    /// same way during the import pass and must not abort the batch. Loads
    /// the persisted fingerprint store first when the options name one.
    pub fn load_hashes(&mut self, paths: &[PathBuf], options: &ImportOptions) {
        if self.ready {
            log::warn!("dedup engine is already loaded; ignoring repeated load_hashes");
            return;
        }
        self.tag = if options.texcoords.use_extra_stream {
            StreamTag::ExtraUv
        } else {
            StreamTag::Primary
        };

        if let Some(store_path) = &options.dedup.store_path {
            if store_path.is_file() {
                match self.load_store(store_path) {
                    Ok(count) => {
                        log::info!("loaded {count} fingerprints from {}", store_path.display());
                    }
                    Err(e) => {
                        log::warn!(
                            "failed to load fingerprint store {}: {e}",
                            store_path.display()
                        );
                    }
                }
            }
        }

        for path in paths {
            match parse_capture(path) {
                Ok(capture) => {
                    for (mesh_index, mesh) in capture.meshes().iter().enumerate() {
                        self.fingerprints
                            .insert((path.clone(), mesh_index), fingerprint_mesh(mesh));
                    }
                }
                Err(e) => {
                    log::warn!("dedup pre-scan skipping {}: {e}", path.display());
                }
            }
        }

        self.ready = true;
    }

    /// Decide whether one mesh duplicates already-imported content.
    ///
    /// First sight of a fingerprint records it and returns `(false, None)`;
    /// every later identical fingerprint returns `(true, message)` where the
    /// message names the first occurrence. Unknown (path, index) pairs —
    /// e.g. a file that failed the pre-scan — are never skipped.
    pub fn should_skip(&self, path: &Path, mesh_index: usize) -> (bool, Option<String>) {
        if !self.ready {
            log::error!("should_skip called before load_hashes");
            return (false, None);
        }
        let Some(&fingerprint) = self.fingerprints.get(&(path.to_path_buf(), mesh_index)) else {
            return (false, None);
        };
        let key = DedupKey {
            tag: self.tag,
            fingerprint,
        };

        {
            let store = self.store.read();
            if let Some(origin) = store.get(&key) {
                return (true, Some(skip_message(origin, path, mesh_index)));
            }
        }

        let mut store = self.store.write();
        match store.entry(key) {
            Entry::Occupied(entry) => {
                // Another thread won the insert between our two locks.
                (true, Some(skip_message(entry.get(), path, mesh_index)))
            }
            Entry::Vacant(slot) => {
                slot.insert(Origin::Run {
                    path: path.to_path_buf(),
                    mesh_index,
                });
                (false, None)
            }
        }
    }

    /// Persist all known fingerprints, one per line.
    pub fn save_store(&self, path: &Path) -> std::io::Result<()> {
        let store = self.store.read();
        let mut out = String::new();
        for key in store.keys() {
            out.push(key.tag.letter());
            out.push(' ');
            out.push_str(&format!("{:016x}\n", key.fingerprint));
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(out.as_bytes())
    }

    fn load_store(&mut self, path: &Path) -> std::io::Result<usize> {
        let contents = std::fs::read_to_string(path)?;
        let mut store = self.store.write();
        let mut count = 0;
        for line in contents.lines() {
            let mut parts = line.split_whitespace();
            let tag = parts.next().and_then(StreamTag::from_letter);
            let fingerprint = parts.next().and_then(|s| u64::from_str_radix(s, 16).ok());
            match (tag, fingerprint) {
                (Some(tag), Some(fingerprint)) => {
                    store.insert(DedupKey { tag, fingerprint }, Origin::Store);
                    count += 1;
                }
                _ => log::warn!("ignoring malformed fingerprint line: {line:?}"),
            }
        }
        Ok(count)
    }
}

impl Default for DedupEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn skip_message(origin: &Origin, path: &Path, mesh_index: usize) -> String {
    match origin {
        Origin::Run {
            path: first_path,
            mesh_index: first_index,
        } => format!(
            "mesh {mesh_index} in {} duplicates mesh {first_index} from {}",
            path.display(),
            first_path.display()
        ),
        Origin::Store => format!(
            "mesh {mesh_index} in {} matches a fingerprint from the persisted store",
            path.display()
        ),
    }
}
