//! Capture container decoding.
//!
//! A capture file is a fixed header followed by self-describing mesh
//! records; every sub-record carries its own byte length so the parser can
//! skip trailing data it does not understand. Parsing is a single linear
//! scan and is all-or-nothing per file: no partially decoded [`CaptureFile`]
//! is ever returned.

use std::path::{Path, PathBuf};

use super::error::ParseError;
use super::layout::{
    AttributeDescriptor, AttributeTable, ScalarType, ShaderStage, Topology, MAX_ATTRIBUTE_INDEX,
};

/// Magic bytes at the start of every capture file.
pub const CAPTURE_MAGIC: [u8; 4] = *b"RIPC";

/// Container version this parser understands.
pub const CAPTURE_VERSION: u32 = 1;

/// File extension used by the capture tool.
pub const CAPTURE_EXTENSION: &str = "rip";

/// Little-endian byte cursor over one capture file.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(ParseError::Truncated(format!(
                "{what}: need {len} bytes, {} left",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u16(&mut self, what: &str) -> Result<u16, ParseError> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, ParseError> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self, what: &str) -> Result<u64, ParseError> {
        let b = self.take(8, what)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_string(&mut self, len: usize, what: &str) -> Result<String, ParseError> {
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ParseError::BadTag(format!("{what}: invalid UTF-8")))
    }
}

/// Raw index data of one draw call.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    data: Vec<u8>,
    index_count: u32,
}

impl IndexBuffer {
    #[cfg(test)]
    pub(crate) fn from_parts(data: Vec<u8>, index_count: u32) -> Self {
        Self { data, index_count }
    }

    /// Number of declared indices.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Raw little-endian u32 index bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.index_count == 0
    }
}

/// One vertex stream: an attribute table plus the raw vertex bytes.
///
/// Invariant (parse-time validated): `data.len() == vertex_count * stride`.
#[derive(Debug, Clone)]
pub struct VertexStream {
    table: AttributeTable,
    data: Vec<u8>,
    vertex_count: u32,
}

impl VertexStream {
    #[cfg(test)]
    pub(crate) fn from_parts(table: AttributeTable, data: Vec<u8>, vertex_count: u32) -> Self {
        Self {
            table,
            data,
            vertex_count,
        }
    }

    /// The stream's attribute table.
    pub fn table(&self) -> &AttributeTable {
        &self.table
    }

    /// Raw interleaved vertex bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of vertices in the stream.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// One recorded draw call. Immutable after parse.
#[derive(Debug, Clone)]
pub struct MeshRecord {
    pub stage: ShaderStage,
    pub topology: Topology,
    /// Opaque grouping id, consumed by the host's grouping layer.
    pub group0: u32,
    /// Opaque grouping id, consumed by the host's grouping layer.
    pub group1: u32,
    /// Render-target width at capture time (0 if unknown).
    pub width: u32,
    /// Render-target height at capture time (0 if unknown).
    pub height: u32,
    streams: Vec<VertexStream>,
    indices: IndexBuffer,
    textures: Vec<String>,
}

impl MeshRecord {
    /// All vertex streams (stream 0 primary, stream 1 optional extra-UV).
    pub fn streams(&self) -> &[VertexStream] {
        &self.streams
    }

    /// One vertex stream by slot.
    pub fn stream(&self, slot: usize) -> Option<&VertexStream> {
        self.streams.get(slot)
    }

    /// The draw call's index buffer (may declare zero indices).
    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    /// Recorded texture paths, relative to the capture file's directory.
    pub fn textures(&self) -> &[String] {
        &self.textures
    }
}

/// A fully parsed capture file: an ordered sequence of mesh records.
#[derive(Debug, Clone)]
pub struct CaptureFile {
    source_path: PathBuf,
    file_size: u64,
    meshes: Vec<MeshRecord>,
}

impl CaptureFile {
    /// Path the capture was parsed from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory texture paths resolve against.
    pub fn directory(&self) -> Option<&Path> {
        self.source_path.parent()
    }

    /// Total byte size recorded by the capture tool (reporting only).
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn meshes(&self) -> &[MeshRecord] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

/// Read and parse one capture file from disk.
pub fn parse_capture(path: &Path) -> Result<CaptureFile, ParseError> {
    let bytes = std::fs::read(path)?;
    parse_capture_bytes(&bytes, path)
}

/// Parse a capture from bytes already in memory.
///
/// `source_path` is recorded for texture resolution and reporting; it does
/// not need to exist on disk.
pub fn parse_capture_bytes(
    bytes: &[u8],
    source_path: impl Into<PathBuf>,
) -> Result<CaptureFile, ParseError> {
    let mut r = Reader::new(bytes);

    let magic = r.take(4, "file magic")?;
    if magic != CAPTURE_MAGIC {
        return Err(ParseError::BadTag(format!("unknown file magic {magic:02x?}")));
    }
    let version = r.read_u32("container version")?;
    if version != CAPTURE_VERSION {
        return Err(ParseError::BadTag(format!(
            "unsupported container version {version}"
        )));
    }
    let mesh_count = r.read_u32("mesh count")?;
    let file_size = r.read_u64("file size")?;

    let mut meshes = Vec::new();
    for mesh_idx in 0..mesh_count {
        let record_len = r.read_u32("mesh record length")? as usize;
        let body = r.take(record_len, "mesh record body")?;
        meshes.push(parse_mesh_record(body, mesh_idx)?);
    }

    if r.remaining() > 0 {
        log::debug!(
            "ignoring {} trailing bytes after the last mesh record",
            r.remaining()
        );
    }

    Ok(CaptureFile {
        source_path: source_path.into(),
        file_size,
        meshes,
    })
}

fn parse_mesh_record(body: &[u8], mesh_idx: u32) -> Result<MeshRecord, ParseError> {
    let mut r = Reader::new(body);

    let stage_tag = r.read_u32("shader stage")?;
    let stage = ShaderStage::from_tag(stage_tag).ok_or_else(|| {
        ParseError::BadTag(format!("mesh {mesh_idx}: unknown shader stage tag {stage_tag}"))
    })?;

    let topology_tag = r.read_u32("topology")?;
    let topology = Topology::from_tag(topology_tag).ok_or_else(|| {
        ParseError::BadTag(format!("mesh {mesh_idx}: unknown topology tag {topology_tag}"))
    })?;

    let group0 = r.read_u32("group0")?;
    let group1 = r.read_u32("group1")?;
    let width = r.read_u32("capture width")?;
    let height = r.read_u32("capture height")?;

    let stream_count = r.read_u32("stream count")?;
    if stream_count > 2 {
        return Err(ParseError::BadTag(format!(
            "mesh {mesh_idx}: stream count {stream_count} exceeds 2"
        )));
    }
    let mut streams = Vec::new();
    for stream_idx in 0..stream_count {
        streams.push(parse_vertex_stream(&mut r, mesh_idx, stream_idx)?);
    }

    let indices = parse_index_record(&mut r, mesh_idx)?;
    let textures = parse_texture_record(&mut r, mesh_idx)?;

    // A record may carry data added by newer capture tools; skip it.
    if r.remaining() > 0 {
        log::debug!(
            "mesh {mesh_idx}: ignoring {} trailing record bytes",
            r.remaining()
        );
    }

    Ok(MeshRecord {
        stage,
        topology,
        group0,
        group1,
        width,
        height,
        streams,
        indices,
        textures,
    })
}

fn parse_vertex_stream(
    r: &mut Reader<'_>,
    mesh_idx: u32,
    stream_idx: u32,
) -> Result<VertexStream, ParseError> {
    let sub_len = r.read_u32("vertex stream length")? as usize;
    let body = r.take(sub_len, "vertex stream body")?;
    let mut r = Reader::new(body);

    let attr_count = r.read_u32("attribute count")?;
    if attr_count > u32::from(MAX_ATTRIBUTE_INDEX) + 1 {
        return Err(ParseError::BadTag(format!(
            "mesh {mesh_idx} stream {stream_idx}: attribute count {attr_count} exceeds {}",
            u32::from(MAX_ATTRIBUTE_INDEX) + 1
        )));
    }

    let mut attrs = Vec::with_capacity(attr_count as usize);
    for _ in 0..attr_count {
        let index = r.read_u16("attribute index")?;
        let components = r.read_u16("component count")?;
        let scalar_tag = r.read_u16("scalar type")?;
        let scalar = ScalarType::from_tag(scalar_tag).ok_or_else(|| {
            ParseError::BadTag(format!(
                "mesh {mesh_idx} stream {stream_idx}: unknown scalar type tag {scalar_tag}"
            ))
        })?;
        let name_len = r.read_u16("attribute name length")? as usize;
        let name = if name_len > 0 {
            Some(r.read_string(name_len, "attribute name")?)
        } else {
            None
        };
        let offset = r.read_u32("attribute offset")?;
        attrs.push(AttributeDescriptor {
            index,
            components,
            scalar,
            name,
            offset,
        });
    }

    let table = AttributeTable::new(attrs)?;

    let vertex_count = r.read_u32("vertex count")?;
    let byte_len = u64::from(vertex_count) * u64::from(table.stride());
    if byte_len > r.remaining() as u64 {
        return Err(ParseError::Truncated(format!(
            "mesh {mesh_idx} stream {stream_idx}: {vertex_count} vertices x stride {} \
             need {byte_len} bytes, {} left",
            table.stride(),
            r.remaining()
        )));
    }
    let data = r.take(byte_len as usize, "vertex data")?.to_vec();

    Ok(VertexStream {
        table,
        data,
        vertex_count,
    })
}

fn parse_index_record(r: &mut Reader<'_>, mesh_idx: u32) -> Result<IndexBuffer, ParseError> {
    let sub_len = r.read_u32("index record length")? as usize;
    let body = r.take(sub_len, "index record body")?;
    let mut r = Reader::new(body);

    let index_count = r.read_u32("index count")?;
    let byte_len = u64::from(index_count) * 4;
    if byte_len > r.remaining() as u64 {
        return Err(ParseError::Truncated(format!(
            "mesh {mesh_idx}: {index_count} indices need {byte_len} bytes, {} left",
            r.remaining()
        )));
    }
    let data = r.take(byte_len as usize, "index data")?.to_vec();

    Ok(IndexBuffer { data, index_count })
}

fn parse_texture_record(r: &mut Reader<'_>, mesh_idx: u32) -> Result<Vec<String>, ParseError> {
    let sub_len = r.read_u32("texture record length")? as usize;
    let body = r.take(sub_len, "texture record body")?;
    let mut r = Reader::new(body);

    let tex_count = r.read_u32("texture count")?;
    let mut textures = Vec::new();
    for tex_idx in 0..tex_count {
        let path_len = r.read_u16("texture path length")? as usize;
        let path = r.read_string(
            path_len,
            &format!("mesh {mesh_idx} texture path {tex_idx}"),
        )?;
        textures.push(path);
    }
    Ok(textures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header(mesh_count: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&CAPTURE_MAGIC);
        bytes.extend_from_slice(&CAPTURE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&mesh_count.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = minimal_header(0);
        bytes[0] = b'X';
        let err = parse_capture_bytes(&bytes, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::BadTag(_)));
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut bytes = minimal_header(0);
        bytes[4] = 9;
        let err = parse_capture_bytes(&bytes, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::BadTag(_)));
    }

    #[test]
    fn test_rejects_truncated_header() {
        let err = parse_capture_bytes(&CAPTURE_MAGIC, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::Truncated(_)));
    }

    #[test]
    fn test_empty_capture_parses() {
        let capture = parse_capture_bytes(&minimal_header(0), "test.rip").expect("parse");
        assert_eq!(capture.mesh_count(), 0);
    }

    #[test]
    fn test_missing_mesh_record_is_truncated() {
        // Header promises one mesh but carries none.
        let bytes = minimal_header(1);
        let err = parse_capture_bytes(&bytes, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::Truncated(_)));
    }

    #[test]
    fn test_record_length_past_end_is_truncated() {
        let mut bytes = minimal_header(1);
        bytes.extend_from_slice(&100u32.to_le_bytes()); // record_len
        bytes.extend_from_slice(&[0u8; 8]); // only 8 bytes follow
        let err = parse_capture_bytes(&bytes, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::Truncated(_)));
    }

    #[test]
    fn test_unknown_stage_tag_is_bad_tag() {
        let mut record = Vec::new();
        record.extend_from_slice(&7u32.to_le_bytes()); // bad stage tag
        record.extend_from_slice(&0u32.to_le_bytes()); // topology
        record.extend_from_slice(&[0u8; 16]); // groups + width/height
        record.extend_from_slice(&0u32.to_le_bytes()); // stream count
        record.extend_from_slice(&4u32.to_le_bytes()); // index sub_len
        record.extend_from_slice(&0u32.to_le_bytes()); // index count
        record.extend_from_slice(&4u32.to_le_bytes()); // texture sub_len
        record.extend_from_slice(&0u32.to_le_bytes()); // texture count

        let mut bytes = minimal_header(1);
        bytes.extend_from_slice(&(record.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&record);

        let err = parse_capture_bytes(&bytes, "test.rip").unwrap_err();
        assert!(matches!(err, ParseError::BadTag(_)));
    }

    #[test]
    fn test_io_error_on_missing_file() {
        let err = parse_capture(Path::new("/nonexistent/path/file.rip")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
