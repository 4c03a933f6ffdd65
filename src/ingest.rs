//! Ingestion adapter.
//!
//! Normalizes the two ways content enters a project (manual entry in the
//! add dialog, and drag-and-drop) into a single [`ContextFile`] before it
//! reaches the store. Dropped items carry their own name and payload; the
//! adapter fills both in so the caller never retypes anything.
//!
//! Staging and committing are separate on the add-dialog path: nothing is
//! written until the caller confirms. Dropping onto the main view writes
//! immediately with no intermediate step.

use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::classify;
use crate::models::{ContextFile, FileKind};
use crate::store::ContextStore;

/// Raw payload carried by a dropped item.
#[derive(Debug, Clone)]
pub enum DroppedPayload {
    Text(String),
    Bytes(Vec<u8>),
}

/// A file dropped onto the UI, before normalization.
#[derive(Debug, Clone)]
pub struct DroppedItem {
    pub name: String,
    pub payload: DroppedPayload,
}

/// Normalize explicit form fields into a writable context file.
pub fn manual(name: &str, content: &str, kind: FileKind) -> Result<ContextFile> {
    if name.is_empty() {
        bail!("context file name must not be empty");
    }

    Ok(ContextFile {
        name: name.to_string(),
        kind,
        content: content.to_string(),
    })
}

/// Normalize a dropped item into a writable context file without touching
/// the store. The add-dialog path calls this, shows the result, and only
/// writes on [`commit`].
///
/// Image payloads become `data:<mime>;base64,…` strings. Text payloads pass
/// through verbatim; already-encoded data-URL text stays as-is. Binary
/// payloads for non-image names must be valid UTF-8.
pub fn stage(item: &DroppedItem) -> Result<ContextFile> {
    if item.name.is_empty() {
        bail!("dropped item has no file name");
    }

    let kind = classify::kind_of(&item.name);

    let content = match (&item.payload, kind) {
        (DroppedPayload::Text(text), _) => text.clone(),
        (DroppedPayload::Bytes(bytes), FileKind::Image) => {
            let mime = classify::image_mime(&item.name).unwrap_or("application/octet-stream");
            format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
        }
        (DroppedPayload::Bytes(bytes), FileKind::Text) => match String::from_utf8(bytes.clone()) {
            Ok(text) => text,
            Err(_) => bail!(
                "dropped file '{}' is not valid UTF-8 and is not a recognized image",
                item.name
            ),
        },
    };

    Ok(ContextFile {
        name: item.name.clone(),
        kind,
        content,
    })
}

/// Explicit confirm step for the add-dialog path.
pub fn commit(store: &ContextStore, file: &ContextFile) -> Result<()> {
    store.write(file)?;
    Ok(())
}

/// Direct drop onto the main view: normalize and write in one step.
pub fn drop_onto_view(store: &ContextStore, item: &DroppedItem) -> Result<ContextFile> {
    let file = stage(item)?;
    store.write(&file)?;
    Ok(file)
}

/// Decode the payload of a stored image data-URL back into raw bytes.
///
/// Counterpart to the encoding done in [`stage`]; used when exporting an
/// image back out of the store.
pub fn decode_data_url(content: &str) -> Result<Vec<u8>> {
    let rest = content
        .strip_prefix("data:")
        .ok_or_else(|| anyhow::anyhow!("not a data URL"))?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| anyhow::anyhow!("data URL is not base64-encoded"))?;
    Ok(STANDARD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ContextStore) {
        let tmp = TempDir::new().unwrap();
        let store = ContextStore::open(tmp.path().join("context")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_manual_entry() {
        let file = manual("notes.md", "# Notes", FileKind::Text).unwrap();
        assert_eq!(file.name, "notes.md");
        assert_eq!(file.content, "# Notes");
    }

    #[test]
    fn test_manual_empty_name_rejected() {
        assert!(manual("", "content", FileKind::Text).is_err());
    }

    #[test]
    fn test_manual_empty_content_allowed() {
        let file = manual("empty.txt", "", FileKind::Text).unwrap();
        assert_eq!(file.content, "");
    }

    #[test]
    fn test_stage_text_drop_passes_through() {
        let item = DroppedItem {
            name: "dropped.txt".to_string(),
            payload: DroppedPayload::Text("dropped text".to_string()),
        };
        let file = stage(&item).unwrap();
        assert_eq!(file.name, "dropped.txt");
        assert_eq!(file.kind, FileKind::Text);
        assert_eq!(file.content, "dropped text");
    }

    #[test]
    fn test_stage_image_bytes_become_data_url() {
        let bytes = vec![0x89, 0x50, 0x4E, 0x47];
        let item = DroppedItem {
            name: "pixel.png".to_string(),
            payload: DroppedPayload::Bytes(bytes.clone()),
        };
        let file = stage(&item).unwrap();
        assert_eq!(file.kind, FileKind::Image);
        assert!(file.content.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&file.content).unwrap(), bytes);
    }

    #[test]
    fn test_stage_does_not_write() {
        let (_tmp, store) = store();
        let item = DroppedItem {
            name: "staged.txt".to_string(),
            payload: DroppedPayload::Text("pending".to_string()),
        };

        let file = stage(&item).unwrap();
        assert!(store.list().unwrap().is_empty());

        commit(&store, &file).unwrap();
        assert_eq!(store.read("staged.txt").unwrap().content, "pending");
    }

    #[test]
    fn test_drop_onto_view_writes_immediately() {
        let (_tmp, store) = store();
        let item = DroppedItem {
            name: "main-drop.txt".to_string(),
            payload: DroppedPayload::Text(
                "This is a text file dropped onto the main view.".to_string(),
            ),
        };

        drop_onto_view(&store, &item).unwrap();
        assert_eq!(
            store.read("main-drop.txt").unwrap().content,
            "This is a text file dropped onto the main view."
        );
    }

    #[test]
    fn test_non_utf8_text_drop_rejected() {
        let item = DroppedItem {
            name: "blob.txt".to_string(),
            payload: DroppedPayload::Bytes(vec![0xFF, 0xFE, 0x00]),
        };
        assert!(stage(&item).is_err());
    }

    #[test]
    fn test_image_data_url_round_trip_through_store() {
        let (_tmp, store) = store();
        let bytes: Vec<u8> = (0..64).collect();
        let item = DroppedItem {
            name: "grad.png".to_string(),
            payload: DroppedPayload::Bytes(bytes.clone()),
        };

        let written = drop_onto_view(&store, &item).unwrap();
        let read = store.read("grad.png").unwrap();
        assert_eq!(read.content, written.content);
        assert_eq!(decode_data_url(&read.content).unwrap(), bytes);
    }
}
