//! GPU draw-call capture decoding and mesh reconstruction.
//!
//! Loads capture files produced by a draw-call ripping tool — per-draw
//! dumps of raw vertex buffers, index buffers, shader-stage tags and
//! referenced texture paths — and reconstructs renderable geometry from
//! them: positions, normals, UV sets, per-vertex colors and topology.
//!
//! # Addressing
//!
//! Captures describe vertex data through an opaque, per-draw attribute
//! layout: the same semantic role can live at different
//! (attribute, component) addresses in different captures. Roles are
//! located either through explicit addresses in [`ImportOptions`] or by the
//! Auto-mode heuristics in [`resolve`].
//!
//! # Position spaces
//!
//! A capture records vertex positions either before the vertex shader
//! (object space, passed through) or after it (homogeneous clip space).
//! Clip-space data is mapped back via [`options::Reprojection`]: perspective
//! divide alone, a user-supplied inverse projection, or an analytically
//! inverted perspective/orthographic projection built from parameters.
//!
//! # Example
//!
//! ```ignore
//! use ripcap_core::capture::{parse_capture, reconstruct_mesh, ImportOptions};
//!
//! let capture = parse_capture(std::path::Path::new("draw_0042.rip"))?;
//! let options = ImportOptions::default();
//! for index in 0..capture.mesh_count() {
//!     match reconstruct_mesh(&capture, index, &options) {
//!         Ok(geometry) => println!("mesh {index}: {} vertices", geometry.vertex_count()),
//!         Err(reason) => log::warn!("mesh {index} skipped: {reason}"),
//!     }
//! }
//! # Ok::<(), ripcap_core::capture::ParseError>(())
//! ```

mod container;
mod error;
mod reconstruct;
#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub mod dedup;
pub mod indices;
pub mod layout;
pub mod options;
pub mod position;
pub mod resolve;
pub mod textures;
pub mod types;
pub mod unpack;

pub use container::{
    parse_capture, parse_capture_bytes, CaptureFile, IndexBuffer, MeshRecord, VertexStream,
    CAPTURE_EXTENSION, CAPTURE_MAGIC, CAPTURE_VERSION,
};
pub use dedup::DedupEngine;
pub use error::{ParseError, SkipReason};
pub use indices::Primitives;
pub use layout::{AttrComp, AttributeDescriptor, AttributeTable, ScalarType, ShaderStage, Topology};
pub use options::ImportOptions;
pub use reconstruct::reconstruct_mesh;
pub use textures::MaterialKey;
pub use types::ReconstructedGeometry;
