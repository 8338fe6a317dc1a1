//! Attachment references for instruction content.

use serde::{Deserialize, Serialize};

/// Kind of an uploaded asset referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Photographs, sketches, placement diagrams.
    Image,
    /// Spec sheets, supplier PDFs, grading charts.
    Document,
}

/// A reference to an uploaded asset.
///
/// Immutable value object: created on upload, never mutated, removed by
/// filtering it out of the owning attachment list. The URL is a reference
/// into the asset store; the core never inspects file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name (usually the original file name).
    pub name: String,
    /// Asset store URL.
    pub url: String,
    /// Asset kind.
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Create a new attachment reference.
    #[must_use]
    pub const fn new(name: String, url: String, kind: AttachmentKind) -> Self {
        Self { name, url, kind }
    }
}
