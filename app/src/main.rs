//! ripcap batch importer.
//!
//! Imports GPU draw-call capture files and writes the reconstructed
//! geometry as Wavefront OBJ/MTL. One malformed capture never aborts a
//! batch: parse failures are logged and the importer continues with the
//! next input.

mod export;
mod filters;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use ripcap_core::capture::options::{
    ColorOptions, DedupOptions, FovParams, Handedness, NormalMode, OrthoParams, Reprojection,
    TexCoordOptions,
};
use ripcap_core::capture::{
    parse_capture, reconstruct_mesh, DedupEngine, ImportOptions, ShaderStage, CAPTURE_EXTENSION,
};
use ripcap_core::math::Mat4;

use export::ObjExporter;
use filters::FilterOptions;

/// Which recorded shader stage to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliStage {
    /// Input-assembler data (object-space positions).
    #[default]
    Pre,
    /// Vertex-shader output (clip-space positions, un-projected).
    Post,
}

/// Clip-space un-projection mode for post-transform captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliProjection {
    /// Perspective divide only (output stays in NDC).
    #[default]
    None,
    /// Invert a perspective projection built from --fov.
    Fov,
    /// Invert a symmetric orthographic projection.
    Ortho,
    /// Apply the matrix given with --matrix.
    Matrix,
}

/// Batch capture importer: reconstructs mesh geometry from GPU draw-call
/// captures and writes OBJ/MTL output.
#[derive(Parser, Debug)]
#[command(name = "ripcap", version)]
struct Args {
    /// Capture files or directories containing .rip files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output OBJ path; the MTL file is written alongside it.
    #[arg(short, long, default_value = "capture.obj")]
    output: PathBuf,

    /// Shader stage to import.
    #[arg(long, default_value = "pre", value_enum)]
    stage: CliStage,

    /// Un-projection mode for post-transform captures.
    #[arg(long, default_value = "none", value_enum)]
    projection: CliProjection,

    /// Vertical field of view in degrees (FOV mode).
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    /// Aspect ratio used when a capture has no width/height metadata.
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f32,

    /// Near plane of the assumed projection.
    #[arg(long, default_value_t = 0.1)]
    znear: f32,

    /// Far plane of the assumed projection.
    #[arg(long, default_value_t = 1000.0)]
    zfar: f32,

    /// Negate Z after un-projection (left-handed captures).
    #[arg(long)]
    left_handed: bool,

    /// 16 comma-separated row-major values of an inverse-projection matrix
    /// (Matrix mode).
    #[arg(long)]
    matrix: Option<String>,

    /// Load only this UV set instead of all discovered sets.
    #[arg(long)]
    uv_set: Option<usize>,

    /// Read UVs from the extra vertex stream when present.
    #[arg(long)]
    extra_uv: bool,

    /// Load vertex colors.
    #[arg(long)]
    colors: bool,

    /// Do not load normals.
    #[arg(long)]
    no_normals: bool,

    /// Skip meshes whose geometry was already imported.
    #[arg(long)]
    dedup: bool,

    /// Fingerprint store persisted across runs (implies --dedup).
    #[arg(long)]
    dedup_store: Option<PathBuf>,

    /// Skip meshes that reference no textures.
    #[arg(long)]
    skip_untextured: bool,

    /// Skip 4-vertex/2-triangle screen quads.
    #[arg(long)]
    skip_quads: bool,

    /// Skip 12-triangle boxes (skyboxes, bounding cubes).
    #[arg(long)]
    skip_boxes: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let options = match build_options(&args) {
        Ok(options) => options,
        Err(message) => {
            log::error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let files = expand_inputs(&args.inputs);
    if files.is_empty() {
        log::error!("no capture files found in the given inputs");
        return ExitCode::FAILURE;
    }

    let stage = match args.stage {
        CliStage::Pre => ShaderStage::PreTransform,
        CliStage::Post => ShaderStage::PostTransform,
    };
    let filter_options = FilterOptions {
        skip_untextured: args.skip_untextured,
        skip_quads: args.skip_quads,
        skip_boxes: args.skip_boxes,
    };

    let dedup_enabled = options.dedup.enabled;
    let mut engine = DedupEngine::new();
    if dedup_enabled {
        engine.load_hashes(&files, &options);
    }

    let mtl_name = args.output.with_extension("mtl");
    let mut exporter = ObjExporter::new(
        &mtl_name
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture.mtl".to_string()),
    );

    let mut files_parsed = 0usize;
    let mut meshes_created = 0usize;
    let mut largest: Option<(u64, PathBuf)> = None;

    for file in &files {
        log::info!("loading: {}", file.display());
        let capture = match parse_capture(file) {
            Ok(capture) => capture,
            Err(e) => {
                log::error!("capture parsing failed for {}: {e}", file.display());
                continue;
            }
        };

        let mut skip_printed = false;
        for mesh_index in 0..capture.mesh_count() {
            let mesh = &capture.meshes()[mesh_index];

            if mesh.stage != stage {
                continue;
            }

            if dedup_enabled {
                let (skip, message) = engine.should_skip(file, mesh_index);
                if skip {
                    // One line per file is enough; a capture's duplicates
                    // are usually all-or-nothing.
                    if !skip_printed {
                        if let Some(message) = message {
                            log::warn!("{message}");
                        }
                        skip_printed = true;
                    }
                    continue;
                }
            }

            let vertex_count = mesh.stream(0).map_or(0, |s| s.vertex_count());
            if let Some(reason) = filters::filter_reason(
                &filter_options,
                vertex_count,
                mesh.indices().index_count(),
                mesh.textures().len(),
            ) {
                log::warn!("mesh loading skipped: {reason}");
                continue;
            }

            match reconstruct_mesh(&capture, mesh_index, &options) {
                Ok(geometry) => {
                    exporter.add_mesh(
                        &mesh_name(file, mesh_index),
                        (mesh.group0, mesh.group1),
                        &geometry,
                    );
                    meshes_created += 1;
                    let is_largest = largest
                        .as_ref()
                        .map_or(true, |(size, _)| capture.file_size() > *size);
                    if is_largest {
                        largest = Some((capture.file_size(), file.clone()));
                    }
                }
                Err(reason) => {
                    log::warn!("mesh {mesh_index} in {} skipped: {reason}", file.display());
                }
            }
        }
        files_parsed += 1;
    }

    if let Some(store_path) = &options.dedup.store_path {
        if let Err(e) = engine.save_store(store_path) {
            log::error!("failed to save fingerprint store {}: {e}", store_path.display());
        }
    }

    let (obj, mtl) = exporter.finish();
    if let Err(e) = std::fs::write(&args.output, obj) {
        log::error!("failed to write {}: {e}", args.output.display());
        return ExitCode::FAILURE;
    }
    if !mtl.is_empty() {
        if let Err(e) = std::fs::write(&mtl_name, mtl) {
            log::error!("failed to write {}: {e}", mtl_name.display());
            return ExitCode::FAILURE;
        }
    }

    log::info!("parsed files count={files_parsed}");
    log::info!("created meshes={meshes_created}");
    if let Some((size, path)) = largest {
        log::info!("largest capture: {}. size={size}", path.display());
    }
    log::info!("wrote {}", args.output.display());
    ExitCode::SUCCESS
}

/// Translate CLI flags into core import options.
fn build_options(args: &Args) -> Result<ImportOptions, String> {
    let handedness = if args.left_handed {
        Handedness::LeftHanded
    } else {
        Handedness::RightHanded
    };

    let reprojection = match args.projection {
        CliProjection::None => Reprojection::None,
        CliProjection::Fov => Reprojection::Fov(FovParams {
            fov_y_degrees: args.fov,
            fallback_aspect: args.aspect,
            znear: args.znear,
            zfar: args.zfar,
            handedness,
        }),
        CliProjection::Ortho => Reprojection::Orthographic(OrthoParams {
            znear: args.znear,
            zfar: args.zfar,
            handedness,
            ..OrthoParams::default()
        }),
        CliProjection::Matrix => {
            let text = args
                .matrix
                .as_deref()
                .ok_or("--projection matrix requires --matrix")?;
            Reprojection::Matrix(parse_matrix(text)?)
        }
    };

    let mut normals = ripcap_core::capture::options::NormalOptions::default();
    if args.no_normals {
        normals.mode = NormalMode::Disabled;
    }

    Ok(ImportOptions::new()
        .with_reprojection(reprojection)
        .with_normals(normals)
        .with_texcoords(TexCoordOptions {
            set: args.uv_set,
            use_extra_stream: args.extra_uv,
            ..TexCoordOptions::default()
        })
        .with_colors(ColorOptions {
            enabled: args.colors,
            ..ColorOptions::default()
        })
        .with_dedup(DedupOptions {
            enabled: args.dedup || args.dedup_store.is_some(),
            store_path: args.dedup_store.clone(),
        }))
}

/// Parse 16 comma-separated values into a row-major matrix.
fn parse_matrix(text: &str) -> Result<Mat4, String> {
    let values: Result<Vec<f32>, _> = text.split(',').map(|v| v.trim().parse::<f32>()).collect();
    let values = values.map_err(|e| format!("--matrix: {e}"))?;
    if values.len() != 16 {
        return Err(format!("--matrix needs 16 values, got {}", values.len()));
    }
    Ok(Mat4::from_row_slice(&values))
}

/// Expand files and directories into a sorted capture-file list.
fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            match std::fs::read_dir(input) {
                Ok(entries) => {
                    let mut found: Vec<PathBuf> = entries
                        .filter_map(|e| e.ok())
                        .map(|e| e.path())
                        .filter(|p| {
                            p.is_file()
                                && p.extension()
                                    .is_some_and(|ext| ext.eq_ignore_ascii_case(CAPTURE_EXTENSION))
                        })
                        .collect();
                    found.sort();
                    files.extend(found);
                }
                Err(e) => log::error!("cannot read directory {}: {e}", input.display()),
            }
        } else {
            log::warn!("input not found: {}", input.display());
        }
    }
    files
}

/// Mesh name in the output document: capture file stem plus mesh index.
fn mesh_name(file: &Path, mesh_index: usize) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    format!("{stem}_{mesh_index}")
}
