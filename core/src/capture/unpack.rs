//! Scalar extraction from interleaved vertex buffers.

use super::container::VertexStream;
use super::layout::AttrComp;

/// Extract one f32 per requested address per vertex.
///
/// The result is vertex-major: `out[i][k]` is the scalar at `addresses[k]`
/// for vertex `i`. Returns `None` if any address does not resolve against
/// the stream's attribute table (absent attribute index, or component index
/// past the attribute's component count) — a role is either fully available
/// or not available at all, and an invalid address can never turn into an
/// out-of-bounds read.
pub fn unpack_scalars(stream: &VertexStream, addresses: &[AttrComp]) -> Option<Vec<Vec<f32>>> {
    let table = stream.table();

    // Resolve every address to a byte offset within one vertex up front.
    let mut resolved = Vec::with_capacity(addresses.len());
    for address in addresses {
        let desc = table.find(address.attr)?;
        if address.comp >= desc.components {
            return None;
        }
        let offset = desc.offset as usize + address.comp as usize * desc.scalar.size();
        resolved.push((offset, desc.scalar));
    }

    let stride = table.stride() as usize;
    let data = stream.data();
    let vertex_count = stream.vertex_count() as usize;

    let mut rows = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let base = i * stride;
        let mut row = Vec::with_capacity(resolved.len());
        for (offset, scalar) in &resolved {
            row.push(scalar.read(&data[base + offset..]));
        }
        rows.push(row);
    }
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::layout::{AttributeDescriptor, AttributeTable, ScalarType};
    use crate::capture::test_support::stream_from_parts;

    fn f32_table() -> AttributeTable {
        AttributeTable::new(vec![
            AttributeDescriptor {
                index: 0,
                components: 3,
                scalar: ScalarType::F32,
                name: Some("POSITION".into()),
                offset: 0,
            },
            AttributeDescriptor {
                index: 1,
                components: 2,
                scalar: ScalarType::F32,
                name: Some("TEXCOORD".into()),
                offset: 12,
            },
        ])
        .expect("valid table")
    }

    fn pack_f32s(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_unpack_round_trip() {
        // Two vertices: position xyz then uv, all f32.
        let data = pack_f32s(&[1.0, 2.0, 3.0, 0.5, 0.25, -1.0, -2.0, -3.0, 0.75, 1.0]);
        let stream = stream_from_parts(f32_table(), data, 2);

        let rows = unpack_scalars(
            &stream,
            &[AttrComp::new(0, 0), AttrComp::new(0, 1), AttrComp::new(0, 2)],
        )
        .expect("positions resolve");
        assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]]);

        let uvs = unpack_scalars(&stream, &[AttrComp::new(1, 0), AttrComp::new(1, 1)])
            .expect("uvs resolve");
        assert_eq!(uvs, vec![vec![0.5, 0.25], vec![0.75, 1.0]]);
    }

    #[test]
    fn test_unpack_normalized_bytes() {
        let table = AttributeTable::new(vec![AttributeDescriptor {
            index: 0,
            components: 4,
            scalar: ScalarType::U8,
            name: Some("COLOR".into()),
            offset: 0,
        }])
        .expect("valid table");
        let stream = stream_from_parts(table, vec![255, 0, 127, 255], 1);

        let rows = unpack_scalars(
            &stream,
            &[
                AttrComp::new(0, 0),
                AttrComp::new(0, 1),
                AttrComp::new(0, 2),
                AttrComp::new(0, 3),
            ],
        )
        .expect("colors resolve");
        assert_eq!(rows[0][0], 1.0);
        assert_eq!(rows[0][1], 0.0);
        assert!((rows[0][2] - 127.0 / 255.0).abs() < 1e-6);
        assert_eq!(rows[0][3], 1.0);
    }

    #[test]
    fn test_unpack_mixed_scalar_types() {
        // Half-float UVs behind a normalized u16 weight.
        let table = AttributeTable::new(vec![
            AttributeDescriptor {
                index: 0,
                components: 2,
                scalar: ScalarType::F16,
                name: Some("TEXCOORD".into()),
                offset: 0,
            },
            AttributeDescriptor {
                index: 1,
                components: 1,
                scalar: ScalarType::U16,
                name: None,
                offset: 4,
            },
        ])
        .expect("valid table");

        let mut data = Vec::new();
        data.extend_from_slice(&0x3c00u16.to_le_bytes()); // 1.0 as f16
        data.extend_from_slice(&0x3800u16.to_le_bytes()); // 0.5 as f16
        data.extend_from_slice(&65535u16.to_le_bytes()); // 1.0 normalized
        let stream = stream_from_parts(table, data, 1);

        let rows = unpack_scalars(
            &stream,
            &[AttrComp::new(0, 0), AttrComp::new(0, 1), AttrComp::new(1, 0)],
        )
        .expect("mixed scalars resolve");
        assert_eq!(rows, vec![vec![1.0, 0.5, 1.0]]);
    }

    #[test]
    fn test_missing_attribute_fails_whole_role() {
        let data = pack_f32s(&[0.0; 5]);
        let stream = stream_from_parts(f32_table(), data, 1);
        // Attribute 9 does not exist; even though (0,0) would resolve, the
        // whole request fails.
        assert!(unpack_scalars(&stream, &[AttrComp::new(0, 0), AttrComp::new(9, 0)]).is_none());
    }

    #[test]
    fn test_component_out_of_range_fails() {
        let data = pack_f32s(&[0.0; 5]);
        let stream = stream_from_parts(f32_table(), data, 1);
        // Attribute 1 has two components; component 2 is invalid.
        assert!(unpack_scalars(&stream, &[AttrComp::new(1, 2)]).is_none());
    }
}
