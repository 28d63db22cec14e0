//! Shared test helpers: synthetic capture construction.
//!
//! Builds capture bytes in memory so tests carry no binary fixtures. The
//! writers mirror the container layout field by field; raw tag setters stay
//! available so tests can produce deliberately malformed files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use super::container::{CAPTURE_MAGIC, CAPTURE_VERSION, IndexBuffer, VertexStream};
use super::layout::AttributeTable;

/// Create a unique, empty directory under the system temp dir.
pub(crate) fn unique_temp_dir(tag: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let dir = std::env::temp_dir().join(format!(
        "ripcap_test_{tag}_{}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Build a [`VertexStream`] directly from its parts.
pub(crate) fn stream_from_parts(
    table: AttributeTable,
    data: Vec<u8>,
    vertex_count: u32,
) -> VertexStream {
    VertexStream::from_parts(table, data, vertex_count)
}

/// Build an [`IndexBuffer`] from u32 indices.
pub(crate) fn index_buffer(indices: &[u32]) -> IndexBuffer {
    IndexBuffer::from_parts(
        bytemuck::cast_slice(indices).to_vec(),
        indices.len() as u32,
    )
}

/// One attribute descriptor of a synthetic stream.
#[derive(Clone)]
pub(crate) struct AttrDecl {
    pub index: u16,
    pub components: u16,
    pub scalar_tag: u16,
    pub name: Option<String>,
    pub offset: u32,
}

/// Builds one vertex-stream sub-record.
#[derive(Clone, Default)]
pub(crate) struct StreamBuilder {
    attrs: Vec<AttrDecl>,
    data: Vec<u8>,
    vertex_count: u32,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(
        mut self,
        index: u16,
        components: u16,
        scalar_tag: u16,
        name: Option<&str>,
        offset: u32,
    ) -> Self {
        self.attrs.push(AttrDecl {
            index,
            components,
            scalar_tag,
            name: name.map(String::from),
            offset,
        });
        self
    }

    pub fn vertices(mut self, count: u32, data: Vec<u8>) -> Self {
        self.vertex_count = count;
        self.data = data;
        self
    }

    /// f32 vertex data convenience.
    pub fn f32_vertices(self, count: u32, scalars: &[f32]) -> Self {
        let data = scalars.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.vertices(count, data)
    }

    /// Serialize the full sub-record, including its length prefix.
    fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&(self.attrs.len() as u32).to_le_bytes());
        for attr in &self.attrs {
            body.extend_from_slice(&attr.index.to_le_bytes());
            body.extend_from_slice(&attr.components.to_le_bytes());
            body.extend_from_slice(&attr.scalar_tag.to_le_bytes());
            let name = attr.name.as_deref().unwrap_or("");
            body.extend_from_slice(&(name.len() as u16).to_le_bytes());
            body.extend_from_slice(name.as_bytes());
            body.extend_from_slice(&attr.offset.to_le_bytes());
        }
        body.extend_from_slice(&self.vertex_count.to_le_bytes());
        body.extend_from_slice(&self.data);

        let mut out = Vec::with_capacity(body.len() + 4);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }
}

/// Builds one mesh record.
#[derive(Clone)]
pub(crate) struct MeshBuilder {
    stage_tag: u32,
    topology_tag: u32,
    group0: u32,
    group1: u32,
    width: u32,
    height: u32,
    streams: Vec<StreamBuilder>,
    indices: Vec<u32>,
    textures: Vec<String>,
}

impl MeshBuilder {
    /// Pre-transform triangle list by default.
    pub fn new() -> Self {
        Self {
            stage_tag: 0,
            topology_tag: 0,
            group0: 0,
            group1: 0,
            width: 0,
            height: 0,
            streams: Vec::new(),
            indices: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn stage_tag(mut self, tag: u32) -> Self {
        self.stage_tag = tag;
        self
    }

    pub fn topology_tag(mut self, tag: u32) -> Self {
        self.topology_tag = tag;
        self
    }

    pub fn groups(mut self, group0: u32, group1: u32) -> Self {
        self.group0 = group0;
        self.group1 = group1;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn stream(mut self, stream: StreamBuilder) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = indices.to_vec();
        self
    }

    pub fn texture(mut self, name: &str) -> Self {
        self.textures.push(name.to_string());
        self
    }

    /// Serialize the record body (without the outer record_len prefix).
    fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.stage_tag.to_le_bytes());
        body.extend_from_slice(&self.topology_tag.to_le_bytes());
        body.extend_from_slice(&self.group0.to_le_bytes());
        body.extend_from_slice(&self.group1.to_le_bytes());
        body.extend_from_slice(&self.width.to_le_bytes());
        body.extend_from_slice(&self.height.to_le_bytes());

        body.extend_from_slice(&(self.streams.len() as u32).to_le_bytes());
        for stream in &self.streams {
            body.extend_from_slice(&stream.build());
        }

        let index_payload_len = 4 + self.indices.len() * 4;
        body.extend_from_slice(&(index_payload_len as u32).to_le_bytes());
        body.extend_from_slice(&(self.indices.len() as u32).to_le_bytes());
        for index in &self.indices {
            body.extend_from_slice(&index.to_le_bytes());
        }

        let tex_payload_len: usize = 4 + self
            .textures
            .iter()
            .map(|t| 2 + t.len())
            .sum::<usize>();
        body.extend_from_slice(&(tex_payload_len as u32).to_le_bytes());
        body.extend_from_slice(&(self.textures.len() as u32).to_le_bytes());
        for texture in &self.textures {
            body.extend_from_slice(&(texture.len() as u16).to_le_bytes());
            body.extend_from_slice(texture.as_bytes());
        }

        body
    }
}

/// Builds a whole capture file.
#[derive(Clone, Default)]
pub(crate) struct CaptureBuilder {
    meshes: Vec<MeshBuilder>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(mut self, mesh: MeshBuilder) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CAPTURE_MAGIC);
        out.extend_from_slice(&CAPTURE_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.meshes.len() as u32).to_le_bytes());
        // file_size is reporting-only; stamp a deterministic placeholder.
        out.extend_from_slice(&0u64.to_le_bytes());
        for mesh in &self.meshes {
            let body = mesh.build();
            out.extend_from_slice(&(body.len() as u32).to_le_bytes());
            out.extend_from_slice(&body);
        }
        out
    }
}

/// A minimal 3-vertex pre-transform triangle capture with the given index
/// order. Positions: unit right triangle in the XY plane.
pub(crate) fn triangle_capture_bytes(indices: &[u32]) -> Vec<u8> {
    CaptureBuilder::new()
        .mesh(
            MeshBuilder::new()
                .stream(
                    StreamBuilder::new()
                        .attr(0, 3, 0, Some("POSITION"), 0)
                        .f32_vertices(
                            3,
                            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                        ),
                )
                .indices(indices),
        )
        .build()
}
