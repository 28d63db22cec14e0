//! Vertex-layout vocabulary: scalar formats, attribute descriptors and the
//! per-stream attribute table.
//!
//! A capture records each vertex stream's byte layout as an ordered list of
//! attribute descriptors. The table is the single source of truth for the
//! stream's stride and for addressing one scalar inside a vertex.

use super::error::ParseError;

/// Highest attribute index a capture may declare.
pub const MAX_ATTRIBUTE_INDEX: u16 = 63;

/// Scalar component format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit float, passed through.
    F32,
    /// 16-bit float, widened to f32.
    F16,
    /// Unsigned byte, normalized to [0, 1].
    U8,
    /// Signed byte, normalized to [-1, 1].
    S8,
    /// Unsigned short, normalized to [0, 1].
    U16,
    /// Signed short, normalized to [-1, 1].
    S16,
    /// Unsigned int, cast to f32.
    U32,
    /// Signed int, cast to f32.
    S32,
}

impl ScalarType {
    /// Decode the container's scalar-type tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Self::F32),
            1 => Some(Self::F16),
            2 => Some(Self::U8),
            3 => Some(Self::S8),
            4 => Some(Self::U16),
            5 => Some(Self::S16),
            6 => Some(Self::U32),
            7 => Some(Self::S32),
            _ => None,
        }
    }

    /// Size in bytes of one scalar.
    pub fn size(&self) -> usize {
        match self {
            Self::F32 | Self::U32 | Self::S32 => 4,
            Self::F16 | Self::U16 | Self::S16 => 2,
            Self::U8 | Self::S8 => 1,
        }
    }

    /// Read one scalar from the start of `bytes` and convert to f32.
    ///
    /// `bytes` must hold at least [`Self::size`] bytes; the unpacker
    /// guarantees this from the parse-time layout invariants.
    pub fn read(&self, bytes: &[u8]) -> f32 {
        match self {
            Self::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Self::F16 => f16_to_f32(u16::from_le_bytes([bytes[0], bytes[1]])),
            Self::U8 => f32::from(bytes[0]) / 255.0,
            Self::S8 => (f32::from(bytes[0] as i8) / 127.0).max(-1.0),
            Self::U16 => f32::from(u16::from_le_bytes([bytes[0], bytes[1]])) / 65535.0,
            Self::S16 => (f32::from(i16::from_le_bytes([bytes[0], bytes[1]])) / 32767.0).max(-1.0),
            Self::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
            Self::S32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
        }
    }
}

/// Widen an IEEE 754 half float to f32.
fn f16_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits >> 15) << 31;
    let exp = (bits >> 10) & 0x1f;
    let frac = u32::from(bits & 0x3ff);
    let out = match exp {
        0 => {
            if frac == 0 {
                sign // signed zero
            } else {
                // Subnormal half: renormalize into the f32 exponent range.
                let mut exp32: u32 = 127 - 15 + 1;
                let mut frac = frac;
                while frac & 0x400 == 0 {
                    frac <<= 1;
                    exp32 -= 1;
                }
                sign | (exp32 << 23) | ((frac & 0x3ff) << 13)
            }
        }
        0x1f => sign | 0x7f80_0000 | (frac << 13), // inf / NaN
        _ => sign | ((u32::from(exp) + 112) << 23) | (frac << 13),
    };
    f32::from_bits(out)
}

/// Address of one scalar inside a vertex: which attribute, which component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrComp {
    /// Attribute index within the stream's table.
    pub attr: u16,
    /// Scalar component index within the attribute.
    pub comp: u16,
}

impl AttrComp {
    pub fn new(attr: u16, comp: u16) -> Self {
        Self { attr, comp }
    }
}

/// One attribute of a vertex stream's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Attribute index (0..=63), unique within a stream.
    pub index: u16,
    /// Component count (1..=4).
    pub components: u16,
    /// Scalar format of each component.
    pub scalar: ScalarType,
    /// Declared semantic name, if the capture tool recorded one.
    pub name: Option<String>,
    /// Byte offset of the attribute within one vertex.
    pub offset: u32,
}

impl AttributeDescriptor {
    /// Total byte width of the attribute.
    pub fn byte_width(&self) -> u32 {
        u32::from(self.components) * self.scalar.size() as u32
    }

    /// Case-insensitive substring match against the declared name.
    pub fn name_contains(&self, token: &str) -> bool {
        match &self.name {
            Some(name) => name.to_ascii_uppercase().contains(&token.to_ascii_uppercase()),
            None => false,
        }
    }
}

/// Ordered attribute descriptors defining one vertex stream's byte layout.
///
/// Descriptors are stored in ascending offset order; offsets are contiguous
/// and non-overlapping, so the stride equals the sum of attribute widths.
/// Both properties are validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTable {
    attrs: Vec<AttributeDescriptor>,
    stride: u32,
}

impl AttributeTable {
    /// Build a table from parsed descriptors, validating layout invariants.
    pub fn new(attrs: Vec<AttributeDescriptor>) -> Result<Self, ParseError> {
        let stride: u32 = attrs.iter().map(AttributeDescriptor::byte_width).sum();

        // Offsets are untrusted input: widen before adding so a hostile
        // offset near u32::MAX cannot wrap past the stride check.
        let mut prev_end = 0u64;
        for desc in &attrs {
            if desc.index > MAX_ATTRIBUTE_INDEX {
                return Err(ParseError::BadTag(format!(
                    "attribute index {} exceeds {MAX_ATTRIBUTE_INDEX}",
                    desc.index
                )));
            }
            if desc.components == 0 || desc.components > 4 {
                return Err(ParseError::BadTag(format!(
                    "attribute {} has component count {}",
                    desc.index, desc.components
                )));
            }
            if u64::from(desc.offset) < prev_end {
                return Err(ParseError::BadTag(format!(
                    "attribute {} at offset {} overlaps the previous attribute",
                    desc.index, desc.offset
                )));
            }
            prev_end = u64::from(desc.offset) + u64::from(desc.byte_width());
            if prev_end > u64::from(stride) {
                return Err(ParseError::BadTag(format!(
                    "attribute {} ends at byte {prev_end}, past the stride {stride}",
                    desc.index
                )));
            }
            if attrs.iter().filter(|a| a.index == desc.index).count() > 1 {
                return Err(ParseError::BadTag(format!(
                    "attribute index {} declared twice",
                    desc.index
                )));
            }
        }

        Ok(Self { attrs, stride })
    }

    /// Byte stride of one vertex: the sum of attribute widths.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attrs.iter()
    }

    /// Look up a descriptor by attribute index.
    pub fn find(&self, attr_index: u16) -> Option<&AttributeDescriptor> {
        self.attrs.iter().find(|a| a.index == attr_index)
    }

    /// All descriptors whose declared name contains `token`
    /// (case-insensitive), in ascending attribute-index order.
    pub fn named_matches(&self, token: &str) -> Vec<&AttributeDescriptor> {
        let mut matches: Vec<&AttributeDescriptor> = self
            .attrs
            .iter()
            .filter(|a| a.name_contains(token))
            .collect();
        matches.sort_by_key(|a| a.index);
        matches
    }
}

/// Whether recorded vertex positions are before or after the vertex
/// shader's projection transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Input-assembler data: object-space positions.
    PreTransform,
    /// Vertex-shader output: homogeneous clip-space positions.
    PostTransform,
}

impl ShaderStage {
    /// Decode the container's stage tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::PreTransform),
            1 => Some(Self::PostTransform),
            _ => None,
        }
    }
}

/// Primitive topology describing how indices assemble into primitives.
///
/// Strip topologies are recorded by the capture tool and parse cleanly, but
/// reconstruction does not support them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
    PointList,
}

impl Topology {
    /// Decode the container's topology tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::TriangleList),
            1 => Some(Self::TriangleStrip),
            2 => Some(Self::LineList),
            3 => Some(Self::LineStrip),
            4 => Some(Self::PointList),
            _ => None,
        }
    }

    /// Number of vertices per primitive for list topologies (None for strips).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::TriangleStrip | Self::LineStrip => None,
        }
    }
}
