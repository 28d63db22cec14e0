//! Index-buffer decoding.

use super::container::IndexBuffer;
use super::error::ParseError;
use super::layout::Topology;

/// Decoded primitive connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitives {
    /// Ordered triangle index tuples.
    Triangles(Vec<[u32; 3]>),
    /// Ordered line index tuples.
    Lines(Vec<[u32; 2]>),
    /// Every vertex is its own primitive; no index data is consumed.
    Points,
}

impl Primitives {
    /// Number of decoded primitives (None for points, which are implicit).
    pub fn primitive_count(&self) -> Option<usize> {
        match self {
            Self::Triangles(t) => Some(t.len()),
            Self::Lines(l) => Some(l.len()),
            Self::Points => None,
        }
    }
}

/// Decode a raw index buffer into fixed-size tuples for a list topology.
///
/// An index count that is not a multiple of the topology's group size is a
/// truncated buffer — a partial primitive is never silently dropped. Strip
/// topologies are not decodable here; reconstruction rejects them before
/// index decoding.
pub fn decode_indices(buffer: &IndexBuffer, topology: Topology) -> Result<Primitives, ParseError> {
    match topology {
        Topology::PointList => Ok(Primitives::Points),
        Topology::TriangleList => {
            let tuples = decode_tuples::<3>(buffer)?;
            Ok(Primitives::Triangles(tuples))
        }
        Topology::LineList => {
            let tuples = decode_tuples::<2>(buffer)?;
            Ok(Primitives::Lines(tuples))
        }
        Topology::TriangleStrip | Topology::LineStrip => Err(ParseError::BadTag(format!(
            "{topology:?} indices cannot be decoded into fixed-size tuples"
        ))),
    }
}

fn decode_tuples<const N: usize>(buffer: &IndexBuffer) -> Result<Vec<[u32; N]>, ParseError> {
    let count = buffer.index_count() as usize;
    if count % N != 0 {
        return Err(ParseError::Truncated(format!(
            "index count {count} is not a multiple of {N}"
        )));
    }

    let data = buffer.data();
    let mut tuples = Vec::with_capacity(count / N);
    for group in data.chunks_exact(4 * N) {
        let mut tuple = [0u32; N];
        for (k, bytes) in group.chunks_exact(4).enumerate() {
            tuple[k] = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        tuples.push(tuple);
    }
    Ok(tuples)
}
