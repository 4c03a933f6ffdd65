//! Core data types shared across the store, ingestion adapter, and server.

use serde::{Deserialize, Serialize};

/// Whether a context file holds plain UTF-8 text or an encoded image.
///
/// Derived from the file name, never stored separately on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Image,
}

/// A named context artifact belonging to a project.
///
/// `name` is the primary key within the project's context directory and is
/// used verbatim as the backing filename. For images, `content` is the full
/// `data:<mime>;base64,<payload>` string rather than raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFile {
    pub name: String,
    pub kind: FileKind,
    pub content: String,
}
