//! Mesh reconstruction pipeline.
//!
//! Wires the resolver, unpacker, position reconstructor, index decoder and
//! texture resolver together for one mesh record. Failures follow the
//! graceful-degradation ladder: positions and usable connectivity are
//! required (the mesh is skipped without them), everything else degrades to
//! an absent output with a log line.

use super::container::{CaptureFile, MeshRecord, VertexStream};
use super::error::SkipReason;
use super::indices::decode_indices;
use super::layout::{AttrComp, ShaderStage, Topology};
use super::options::{ImportOptions, NormalMode, PositionMode, TexCoordMode};
use super::position::{positions_from_clip_space, positions_from_object_space};
use super::resolve;
use super::textures::resolve_texture_list;
use super::types::ReconstructedGeometry;
use super::unpack::unpack_scalars;

/// Reconstruct renderable geometry from one mesh record.
///
/// # Panics
///
/// Panics if `mesh_index` is out of range; indices come from iterating
/// [`CaptureFile::meshes`].
pub fn reconstruct_mesh(
    capture: &CaptureFile,
    mesh_index: usize,
    options: &ImportOptions,
) -> Result<ReconstructedGeometry, SkipReason> {
    let mesh = &capture.meshes()[mesh_index];

    if matches!(mesh.topology, Topology::TriangleStrip | Topology::LineStrip) {
        return Err(SkipReason::UnsupportedPrimitive(mesh.topology));
    }

    let Some(stream) = mesh.stream(0) else {
        return Err(SkipReason::MissingAttribute(
            "mesh has no vertex stream".to_string(),
        ));
    };

    match mesh.topology {
        Topology::TriangleList => {
            if stream.vertex_count() < 3 {
                return Err(SkipReason::DegenerateTopology(format!(
                    "triangle mesh with {} vertices",
                    stream.vertex_count()
                )));
            }
            if mesh.indices().is_empty() {
                return Err(SkipReason::DegenerateTopology(
                    "triangle mesh without index data".to_string(),
                ));
            }
        }
        Topology::LineList => {
            if stream.vertex_count() < 2 {
                return Err(SkipReason::DegenerateTopology(format!(
                    "line mesh with {} vertices",
                    stream.vertex_count()
                )));
            }
            if mesh.indices().is_empty() {
                return Err(SkipReason::DegenerateTopology(
                    "line mesh without index data".to_string(),
                ));
            }
        }
        _ => {}
    }

    let positions = reconstruct_positions(mesh, stream, options)?;
    let primitives = decode_indices(mesh.indices(), mesh.topology)
        .map_err(|e| SkipReason::DegenerateTopology(e.to_string()))?;

    let normals = reconstruct_normals(stream, options);
    let uv_sets = reconstruct_uv_sets(mesh, stream, options);
    let color_sets = reconstruct_color_sets(stream, options);
    let textures = resolve_texture_list(
        capture.directory(),
        mesh.textures(),
        options.primary_texture_slot,
    );

    Ok(ReconstructedGeometry {
        positions,
        normals,
        uv_sets,
        color_sets,
        primitives,
        textures,
    })
}

fn reconstruct_positions(
    mesh: &MeshRecord,
    stream: &VertexStream,
    options: &ImportOptions,
) -> Result<Vec<[f32; 3]>, SkipReason> {
    match mesh.stage {
        ShaderStage::PreTransform => {
            let addresses = match options.position {
                PositionMode::Explicit(addresses) => addresses,
                PositionMode::Auto => resolve::resolve_position_pre(stream.table()).ok_or_else(
                    || {
                        SkipReason::MissingAttribute(
                            "attribute 0 has fewer than 3 components".to_string(),
                        )
                    },
                )?,
            };
            let rows = unpack_scalars(stream, &addresses).ok_or_else(|| {
                SkipReason::MissingAttribute("position addresses did not resolve".to_string())
            })?;
            Ok(positions_from_object_space(&rows))
        }
        ShaderStage::PostTransform => {
            let addresses =
                resolve::resolve_position_post(stream.table()).ok_or_else(|| {
                    SkipReason::MissingAttribute(
                        "post-transform position requires 4-component attribute 0".to_string(),
                    )
                })?;
            let rows = unpack_scalars(stream, &addresses).ok_or_else(|| {
                SkipReason::MissingAttribute("position addresses did not resolve".to_string())
            })?;
            Ok(positions_from_clip_space(
                &rows,
                mesh.width,
                mesh.height,
                &options.reprojection,
            ))
        }
    }
}

fn reconstruct_normals(stream: &VertexStream, options: &ImportOptions) -> Option<Vec<[f32; 3]>> {
    let addresses = match &options.normals.mode {
        NormalMode::Disabled => return None,
        NormalMode::Explicit(addresses) => *addresses,
        NormalMode::Auto => {
            match resolve::resolve_normals(stream.table(), options.normals.fallback_attr) {
                Some(addresses) => addresses,
                None => {
                    log::debug!("no normal attribute found; the host computes shading normals");
                    return None;
                }
            }
        }
    };
    match unpack_scalars(stream, &addresses) {
        Some(rows) => Some(rows_to_vec3(&rows)),
        None => {
            log::warn!("normal addresses did not resolve; normals disabled for this mesh");
            None
        }
    }
}

fn reconstruct_uv_sets(
    mesh: &MeshRecord,
    primary: &VertexStream,
    options: &ImportOptions,
) -> Vec<Vec<[f32; 2]>> {
    if options.texcoords.mode == TexCoordMode::Disabled {
        return Vec::new();
    }
    let stream = select_uv_stream(mesh, primary, options);

    let pairs: Vec<[AttrComp; 2]> = match &options.texcoords.mode {
        TexCoordMode::Explicit(sets) => sets.clone(),
        _ => resolve::resolve_texcoords(stream.table(), &options.texcoords.name_token),
    };
    let selected: Vec<[AttrComp; 2]> = match options.texcoords.set {
        Some(set_index) => pairs.get(set_index).copied().into_iter().collect(),
        None => pairs,
    };

    let mut uv_sets = Vec::with_capacity(selected.len());
    for pair in &selected {
        match unpack_scalars(stream, pair) {
            Some(rows) => uv_sets.push(rows.iter().map(|r| [r[0], r[1]]).collect()),
            None => log::warn!("UV addresses {pair:?} did not resolve; skipping set"),
        }
    }
    uv_sets
}

/// Pick the stream UVs load from. The extra-UV stream is only usable when
/// its vertex count matches stream 0; a mismatch falls back to the primary
/// stream rather than producing misaligned coordinates.
fn select_uv_stream<'a>(
    mesh: &'a MeshRecord,
    primary: &'a VertexStream,
    options: &ImportOptions,
) -> &'a VertexStream {
    if !options.texcoords.use_extra_stream {
        return primary;
    }
    match mesh.stream(1) {
        Some(extra) if extra.vertex_count() == primary.vertex_count() => extra,
        Some(extra) => {
            log::error!(
                "vertex count != extra vertex count {} != {}",
                primary.vertex_count(),
                extra.vertex_count()
            );
            primary
        }
        None => primary,
    }
}

fn reconstruct_color_sets(stream: &VertexStream, options: &ImportOptions) -> Vec<Vec<[f32; 4]>> {
    if !options.colors.enabled {
        return Vec::new();
    }
    let sets = resolve::resolve_colors(
        stream.table(),
        options.colors.fixed_attr,
        options.colors.swizzle,
    );

    let mut color_sets = Vec::with_capacity(sets.len());
    for set in &sets {
        let mut addresses: Vec<AttrComp> = set.rgb.to_vec();
        if let Some(alpha) = set.alpha {
            addresses.push(alpha);
        }
        match unpack_scalars(stream, &addresses) {
            Some(rows) => {
                let colors = rows
                    .iter()
                    .map(|r| [r[0], r[1], r[2], if r.len() > 3 { r[3] } else { 1.0 }])
                    .collect();
                color_sets.push(colors);
            }
            None => log::warn!("color addresses did not resolve; skipping set"),
        }
    }
    color_sets
}

fn rows_to_vec3(rows: &[Vec<f32>]) -> Vec<[f32; 3]> {
    rows.iter().map(|r| [r[0], r[1], r[2]]).collect()
}
