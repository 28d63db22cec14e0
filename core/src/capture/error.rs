//! Error types for capture decoding and mesh reconstruction.

use super::layout::Topology;

/// Errors that abort parsing of one capture file.
///
/// A `ParseError` is fatal for its file only; batch importers log it and
/// continue with the next input.
#[derive(Debug)]
pub enum ParseError {
    /// A declared length exceeds the remaining bytes.
    Truncated(String),
    /// An unrecognized tag or a structurally invalid record.
    BadTag(String),
    /// Reading the file from disk failed.
    Io(std::io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated(msg) => write!(f, "truncated capture: {msg}"),
            Self::BadTag(msg) => write!(f, "bad tag: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Reasons a single mesh is omitted from reconstruction output.
///
/// Never fatal: the importer logs the reason and moves on to the next mesh
/// in the same file.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A required vertex attribute could not be resolved or unpacked.
    MissingAttribute(String),
    /// The mesh has too few vertices or unusable index data for its topology.
    DegenerateTopology(String),
    /// The mesh's content fingerprint was already imported.
    Duplicate(String),
    /// The recorded topology cannot be reconstructed.
    UnsupportedPrimitive(Topology),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAttribute(msg) => write!(f, "missing attribute: {msg}"),
            Self::DegenerateTopology(msg) => write!(f, "degenerate topology: {msg}"),
            Self::Duplicate(msg) => write!(f, "duplicate mesh: {msg}"),
            Self::UnsupportedPrimitive(topology) => {
                write!(f, "unsupported primitive topology: {topology:?}")
            }
        }
    }
}

impl std::error::Error for SkipReason {}
