//! Auto-mode attribute resolution.
//!
//! Captures do not label which attribute plays which semantic role, so
//! Auto mode infers (attribute, component) addresses by scanning the
//! attribute table with per-role naming/shape heuristics. All functions are
//! pure; the tie-break is always first match in ascending attribute-index
//! order, with no scoring.

use super::layout::{AttrComp, AttributeTable};

/// Object-space position addresses for a pre-transform capture.
///
/// The capture tool emits input-assembler data with the position first, so
/// attribute 0, components 0/1/2 is assumed.
pub fn resolve_position_pre(table: &AttributeTable) -> Option<[AttrComp; 3]> {
    let desc = table.find(0)?;
    if desc.components < 3 {
        return None;
    }
    Some([AttrComp::new(0, 0), AttrComp::new(0, 1), AttrComp::new(0, 2)])
}

/// Clip-space position addresses for a post-transform capture.
///
/// Attribute 0 must carry the full homogeneous xyzw; anything else means
/// the stream is not vertex-shader output we can un-project.
pub fn resolve_position_post(table: &AttributeTable) -> Option<[AttrComp; 4]> {
    let desc = table.find(0)?;
    if desc.components != 4 {
        return None;
    }
    Some([
        AttrComp::new(0, 0),
        AttrComp::new(0, 1),
        AttrComp::new(0, 2),
        AttrComp::new(0, 3),
    ])
}

/// Normal-vector addresses: first attribute named like "NORMAL" with at
/// least three components, falling back to `fallback_attr` when no name
/// matches. `None` disables normals for the mesh.
pub fn resolve_normals(table: &AttributeTable, fallback_attr: u16) -> Option<[AttrComp; 3]> {
    let named = table
        .named_matches("NORMAL")
        .into_iter()
        .find(|desc| desc.components >= 3);
    let desc = match named {
        Some(desc) => desc,
        None => {
            let desc = table.find(fallback_attr)?;
            if desc.components < 3 {
                return None;
            }
            desc
        }
    };
    let attr = desc.index;
    Some([
        AttrComp::new(attr, 0),
        AttrComp::new(attr, 1),
        AttrComp::new(attr, 2),
    ])
}

/// Texture-coordinate pairs: every attribute whose name contains `token`,
/// with consecutive components taken as (u, v) pairs.
///
/// A four-component attribute therefore yields two UV sets. Sets are
/// returned in discovery order (ascending attribute index, then ascending
/// component pair), which is the order UV-set indices address.
pub fn resolve_texcoords(table: &AttributeTable, token: &str) -> Vec<[AttrComp; 2]> {
    let mut sets = Vec::new();
    for desc in table.named_matches(token) {
        let mut comp = 0;
        while comp + 2 <= desc.components {
            sets.push([AttrComp::new(desc.index, comp), AttrComp::new(desc.index, comp + 1)]);
            comp += 2;
        }
    }
    sets
}

/// Addresses of one vertex-color set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAddresses {
    pub rgb: [AttrComp; 3],
    /// Absent when the attribute has no alpha component; the unpacked
    /// color gets alpha 1.0.
    pub alpha: Option<AttrComp>,
}

/// Vertex-color sets, honoring the configured component swizzle.
///
/// When `fixed_attr` is set only that attribute is considered; otherwise
/// every attribute named like "COLOR" contributes a set. Color loading is
/// never auto-enabled — callers only get here when the options ask for it.
pub fn resolve_colors(
    table: &AttributeTable,
    fixed_attr: Option<u16>,
    swizzle: [u16; 4],
) -> Vec<ColorAddresses> {
    let candidates: Vec<u16> = match fixed_attr {
        Some(attr) => table.find(attr).map(|d| d.index).into_iter().collect(),
        None => table.named_matches("COLOR").iter().map(|d| d.index).collect(),
    };

    let mut sets = Vec::new();
    for attr in candidates {
        let Some(desc) = table.find(attr) else {
            continue;
        };
        let [r, g, b, a] = swizzle;
        if r >= desc.components || g >= desc.components || b >= desc.components {
            continue;
        }
        sets.push(ColorAddresses {
            rgb: [
                AttrComp::new(attr, r),
                AttrComp::new(attr, g),
                AttrComp::new(attr, b),
            ],
            alpha: (a < desc.components).then(|| AttrComp::new(attr, a)),
        });
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::layout::{AttributeDescriptor, AttributeTable, ScalarType};

    fn named(
        index: u16,
        components: u16,
        name: Option<&str>,
        offset: u32,
    ) -> AttributeDescriptor {
        AttributeDescriptor {
            index,
            components,
            scalar: ScalarType::F32,
            name: name.map(String::from),
            offset,
        }
    }

    fn table(attrs: Vec<AttributeDescriptor>) -> AttributeTable {
        AttributeTable::new(attrs).expect("valid table")
    }

    #[test]
    fn test_position_pre_defaults_to_attribute_zero() {
        let t = table(vec![named(0, 3, None, 0), named(1, 2, None, 12)]);
        let addrs = resolve_position_pre(&t).expect("position");
        assert_eq!(addrs[2], AttrComp::new(0, 2));
    }

    #[test]
    fn test_position_pre_requires_three_components() {
        let t = table(vec![named(0, 2, None, 0)]);
        assert!(resolve_position_pre(&t).is_none());
    }

    #[test]
    fn test_position_post_requires_four_components() {
        let t3 = table(vec![named(0, 3, None, 0)]);
        assert!(resolve_position_post(&t3).is_none());

        let t4 = table(vec![named(0, 4, None, 0)]);
        let addrs = resolve_position_post(&t4).expect("position");
        assert_eq!(addrs[3], AttrComp::new(0, 3));
    }

    #[test]
    fn test_normals_by_name_case_insensitive() {
        let t = table(vec![
            named(0, 3, Some("POSITION"), 0),
            named(1, 3, Some("normals"), 12),
        ]);
        let addrs = resolve_normals(&t, 1).expect("normals");
        assert_eq!(addrs[0], AttrComp::new(1, 0));
    }

    #[test]
    fn test_normals_first_match_wins() {
        let t = table(vec![
            named(0, 3, Some("NORMAL_A"), 0),
            named(1, 3, Some("NORMAL_B"), 12),
        ]);
        let addrs = resolve_normals(&t, 5).expect("normals");
        assert_eq!(addrs[0].attr, 0);
    }

    #[test]
    fn test_normals_fallback_attribute() {
        let t = table(vec![named(0, 3, None, 0), named(1, 3, None, 12)]);
        let addrs = resolve_normals(&t, 1).expect("fallback normals");
        assert_eq!(addrs[0].attr, 1);
    }

    #[test]
    fn test_normals_disabled_when_nothing_matches() {
        let t = table(vec![named(0, 3, None, 0)]);
        assert!(resolve_normals(&t, 1).is_none());
    }

    #[test]
    fn test_texcoords_multiple_sets() {
        let t = table(vec![
            named(0, 3, Some("POSITION"), 0),
            // A packed 4-component TEXCOORD carries two UV pairs.
            named(1, 4, Some("TEXCOORD01"), 12),
            named(2, 2, Some("TEXCOORD2"), 28),
        ]);
        let sets = resolve_texcoords(&t, "TEXCOORD");
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0], [AttrComp::new(1, 0), AttrComp::new(1, 1)]);
        assert_eq!(sets[1], [AttrComp::new(1, 2), AttrComp::new(1, 3)]);
        assert_eq!(sets[2], [AttrComp::new(2, 0), AttrComp::new(2, 1)]);
    }

    #[test]
    fn test_texcoords_ignore_single_component() {
        let t = table(vec![named(0, 1, Some("TEXCOORD"), 0)]);
        assert!(resolve_texcoords(&t, "TEXCOORD").is_empty());
    }

    #[test]
    fn test_colors_by_name_with_alpha() {
        let t = table(vec![
            named(0, 3, Some("POSITION"), 0),
            named(1, 4, Some("COLOR0"), 12),
        ]);
        let sets = resolve_colors(&t, None, [0, 1, 2, 3]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].rgb[0], AttrComp::new(1, 0));
        assert_eq!(sets[0].alpha, Some(AttrComp::new(1, 3)));
    }

    #[test]
    fn test_colors_without_alpha_component() {
        let t = table(vec![named(0, 3, Some("COLOR"), 0)]);
        let sets = resolve_colors(&t, None, [0, 1, 2, 3]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].alpha, None);
    }

    #[test]
    fn test_colors_fixed_attribute() {
        let t = table(vec![named(0, 3, None, 0), named(2, 4, None, 12)]);
        let sets = resolve_colors(&t, Some(2), [0, 1, 2, 3]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].rgb[0].attr, 2);
        // Unknown fixed attribute yields no sets.
        assert!(resolve_colors(&t, Some(9), [0, 1, 2, 3]).is_empty());
    }
}
