//! Integration tests over synthetic capture files.
//!
//! Capture bytes are assembled in memory by the builders in
//! `test_support`, so no binary fixtures are committed.


use crate::capture::parse_capture_bytes;
use crate::capture::CaptureFile;

/// Parse synthetic capture bytes with a placeholder source path.
fn parse(bytes: &[u8]) -> CaptureFile {
    parse_capture_bytes(bytes, "synthetic.rip").expect("parse synthetic capture")
}
