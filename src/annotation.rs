//! `:KSP_VERSION[...]` annotations embedded in node and value names
//!
//! The marker is matched case-insensitively and only its first occurrence is
//! recognized. The bracketed body is handed over verbatim.

use thiserror::Error;

/// Marker that opens an annotation.
pub const MARKER: &str = ":KSP_VERSION[";
const CLOSE: char = ']';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("unclosed :KSP_VERSION[ annotation in '{name}'")]
    Unclosed { name: String },
}

/// A name split around its annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation<'a> {
    /// Name with the whole `:KSP_VERSION[...]` span removed
    pub stripped: String,
    /// Expression text between the brackets
    pub expression: &'a str,
}

/// Locate the annotation in `name`.
///
/// Returns `Ok(None)` when the name carries no marker.
pub fn extract(name: &str) -> Result<Option<Annotation<'_>>, AnnotationError> {
    let Some(start) = find_marker(name) else {
        return Ok(None);
    };

    let body_start = start + MARKER.len();
    let Some(body_len) = name[body_start..].find(CLOSE) else {
        return Err(AnnotationError::Unclosed {
            name: name.to_string(),
        });
    };
    let body_end = body_start + body_len;

    let mut stripped = String::with_capacity(name.len() - (body_end + 1 - start));
    stripped.push_str(&name[..start]);
    stripped.push_str(&name[body_end + 1..]);

    Ok(Some(Annotation {
        stripped,
        expression: &name[body_start..body_end],
    }))
}

/// Byte offset of the first case-insensitive marker occurrence.
///
/// The marker is ASCII, so any match offset is a char boundary.
fn find_marker(name: &str) -> Option<usize> {
    let marker = MARKER.as_bytes();
    name.as_bytes()
        .windows(marker.len())
        .position(|window| window.eq_ignore_ascii_case(marker))
}
