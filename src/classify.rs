//! File classification by name.
//!
//! Pure functions deciding how a context file is interpreted and displayed.
//! Classification looks only at the final extension, so multi-part names
//! like `notes.v2.md` classify as markdown.

use crate::models::FileKind;

/// Display class of a context file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Markdown,
    Image,
    PlainText,
}

/// Transient view state for an open file. Never persisted; flipping it has
/// no effect on stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Preview,
    Edit,
    Image,
}

/// Image extensions the store recognizes, matched case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// Classify a file name by its final extension.
pub fn classify(name: &str) -> FileClass {
    let ext = match extension(name) {
        Some(e) => e,
        None => return FileClass::PlainText,
    };

    if ext == "md" {
        FileClass::Markdown
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Image
    } else {
        FileClass::PlainText
    }
}

/// MIME type for an image file name, used to build `data:` URLs.
///
/// Returns `None` for names that do not classify as images.
pub fn image_mime(name: &str) -> Option<&'static str> {
    match extension(name)?.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// The storage kind implied by a file name.
pub fn kind_of(name: &str) -> FileKind {
    match classify(name) {
        FileClass::Image => FileKind::Image,
        FileClass::Markdown | FileClass::PlainText => FileKind::Text,
    }
}

impl FileClass {
    /// The view a file opens in: markdown starts in preview, plain text in
    /// the editor, images in the binary preview.
    pub fn initial_view(self) -> ViewState {
        match self {
            FileClass::Markdown => ViewState::Preview,
            FileClass::PlainText => ViewState::Edit,
            FileClass::Image => ViewState::Image,
        }
    }
}

impl ViewState {
    /// Flip between preview and edit. Image previews have no edit mode.
    pub fn toggle(self) -> ViewState {
        match self {
            ViewState::Preview => ViewState::Edit,
            ViewState::Edit => ViewState::Preview,
            ViewState::Image => ViewState::Image,
        }
    }
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_by_extension() {
        assert_eq!(classify("README.md"), FileClass::Markdown);
        assert_eq!(classify("notes.MD"), FileClass::Markdown);
    }

    #[test]
    fn test_last_extension_wins() {
        assert_eq!(classify("notes.v2.md"), FileClass::Markdown);
        assert_eq!(classify("archive.md.txt"), FileClass::PlainText);
    }

    #[test]
    fn test_image_extensions() {
        assert_eq!(classify("logo.png"), FileClass::Image);
        assert_eq!(classify("photo.JPEG"), FileClass::Image);
        assert_eq!(classify("icon.svg"), FileClass::Image);
    }

    #[test]
    fn test_plain_text_fallback() {
        assert_eq!(classify("notes.txt"), FileClass::PlainText);
        assert_eq!(classify("Makefile"), FileClass::PlainText);
        assert_eq!(classify(".gitignore"), FileClass::PlainText);
    }

    #[test]
    fn test_names_with_spaces_and_parens() {
        assert_eq!(classify("context (1).md"), FileClass::Markdown);
        assert_eq!(classify("my notes - draft.txt"), FileClass::PlainText);
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("logo.png"), Some("image/png"));
        assert_eq!(image_mime("photo.jpg"), Some("image/jpeg"));
        assert_eq!(image_mime("notes.md"), None);
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(kind_of("logo.png"), FileKind::Image);
        assert_eq!(kind_of("notes.md"), FileKind::Text);
        assert_eq!(kind_of("data.csv"), FileKind::Text);
    }

    #[test]
    fn test_initial_view() {
        assert_eq!(classify("a.md").initial_view(), ViewState::Preview);
        assert_eq!(classify("a.txt").initial_view(), ViewState::Edit);
        assert_eq!(classify("a.png").initial_view(), ViewState::Image);
    }

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(ViewState::Preview.toggle(), ViewState::Edit);
        assert_eq!(ViewState::Edit.toggle(), ViewState::Preview);
        assert_eq!(ViewState::Image.toggle(), ViewState::Image);
    }
}
