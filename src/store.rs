//! Directory-backed context file store.
//!
//! A [`ContextStore`] owns one project's context directory and is the sole
//! writer to it. Every file under the directory is one context file, with
//! the name used verbatim as the filename (spaces, parentheses, hyphens,
//! and multi-part extensions included). Writes are last-write-wins: storing
//! an existing name silently replaces its content.
//!
//! All operations are synchronous; a caller that writes can immediately
//! `list()` or `read()` and observe the effect. There is no in-process
//! cache, so a `reset()` leaves nothing stale behind.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classify;
use crate::models::ContextFile;

/// Suffix of the transient file used for atomic writes. Entries carrying it
/// are never reported by `list()`.
const TMP_SUFFIX: &str = ".ctxk-tmp";

/// Store error. `NotFound` is a distinct condition so the CLI and HTTP
/// layers can surface it separately from I/O failures.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    InvalidName(String),
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(name) => write!(f, "context file not found: {}", name),
            StoreError::InvalidName(name) => {
                write!(f, "invalid context file name: {:?}", name)
            }
            StoreError::Io(e) => write!(f, "context store I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Filesystem-backed store for one project's context files.
///
/// Constructed per project directory and passed explicitly to callers,
/// never held as a process-wide singleton.
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
}

impl ContextStore {
    /// Open a store over `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The context directory this store owns.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All context file names, sorted lexicographically.
    ///
    /// Includes every regular file under the directory at call time;
    /// subdirectories and in-flight temp files are skipped.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(TMP_SUFFIX) {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Read one context file. Kind is derived from the name; for images the
    /// content is the stored `data:…;base64,…` string, returned exactly as
    /// written.
    pub fn read(&self, name: &str) -> Result<ContextFile, StoreError> {
        let path = self.entry_path(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        Ok(ContextFile {
            name: name.to_string(),
            kind: classify::kind_of(name),
            content,
        })
    }

    /// Create or overwrite a context file. Overwriting an existing name is
    /// not an error: last write wins, silently.
    ///
    /// The content lands via a temp file in the same directory followed by a
    /// rename, so readers never observe a partial write.
    pub fn write(&self, file: &ContextFile) -> Result<(), StoreError> {
        let path = self.entry_path(&file.name)?;
        let tmp = self.root.join(format!("{}{}", file.name, TMP_SUFFIX));

        fs::write(&tmp, &file.content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Delete a context file. `NotFound` if the name does not exist.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.entry_path(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    /// Empty the entire context directory and recreate it.
    ///
    /// Scenario-isolation collaborator: after a reset, `list()` reports an
    /// empty store with no stale state.
    pub fn reset(&self) -> Result<(), StoreError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Whether a name currently exists in the store.
    pub fn contains(&self, name: &str) -> bool {
        match self.entry_path(name) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    /// Resolve a name to its backing path. Names are opaque keys, but they
    /// must stay flat: anything that would leave the context directory is
    /// rejected.
    fn entry_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileKind;
    use tempfile::TempDir;

    fn text_file(name: &str, content: &str) -> ContextFile {
        ContextFile {
            name: name.to_string(),
            kind: FileKind::Text,
            content: content.to_string(),
        }
    }

    fn open_store(tmp: &TempDir) -> ContextStore {
        ContextStore::open(tmp.path().join("context")).unwrap()
    }

    #[test]
    fn test_write_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.write(&text_file("notes.md", "# Hello")).unwrap();
        let read = store.read("notes.md").unwrap();
        assert_eq!(read.content, "# Hello");
        assert_eq!(read.kind, FileKind::Text);
    }

    #[test]
    fn test_empty_content_is_valid() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.write(&text_file("empty.txt", "")).unwrap();
        assert_eq!(store.read("empty.txt").unwrap().content, "");
        assert_eq!(store.list().unwrap(), vec!["empty.txt"]);
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store
            .write(&text_file("test.md", "# Original Content"))
            .unwrap();
        store
            .write(&text_file("test.md", "# New Content - Overwritten"))
            .unwrap();

        assert_eq!(
            store.read("test.md").unwrap().content,
            "# New Content - Overwritten"
        );
        let names = store.list().unwrap();
        assert_eq!(names, vec!["test.md"]);
    }

    #[test]
    fn test_names_are_opaque_keys() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let name = "context (1).md";
        store
            .write(&text_file(name, "Content with parentheses in filename"))
            .unwrap();

        assert_eq!(store.list().unwrap(), vec![name.to_string()]);
        assert_eq!(
            store.read(name).unwrap().content,
            "Content with parentheses in filename"
        );

        store
            .write(&text_file("my notes - draft_2.txt", "draft"))
            .unwrap();
        assert!(store.contains("my notes - draft_2.txt"));
    }

    #[test]
    fn test_image_data_url_round_trips_exactly() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let data_url = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";
        store
            .write(&ContextFile {
                name: "logo.png".to_string(),
                kind: FileKind::Image,
                content: data_url.to_string(),
            })
            .unwrap();

        let read = store.read("logo.png").unwrap();
        assert_eq!(read.kind, FileKind::Image);
        assert_eq!(read.content, data_url);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let err = store.read("nope.txt").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_delete_removes_from_listing() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.write(&text_file("a.txt", "a")).unwrap();
        store.write(&text_file("b.txt", "b")).unwrap();
        store.delete("a.txt").unwrap();

        assert_eq!(store.list().unwrap(), vec!["b.txt"]);
        assert!(matches!(
            store.read("a.txt").unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let err = store.delete("ghost.md").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_list_is_sorted_and_complete() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        for name in ["zeta.txt", "alpha.md", "mid file.txt"] {
            store.write(&text_file(name, name)).unwrap();
        }

        assert_eq!(
            store.list().unwrap(),
            vec!["alpha.md", "mid file.txt", "zeta.txt"]
        );
    }

    #[test]
    fn test_names_with_separators_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let err = store
            .write(&text_file("../escape.txt", "nope"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
        assert!(matches!(
            store.read("a/b.txt").unwrap_err(),
            StoreError::InvalidName(_)
        ));
    }

    #[test]
    fn test_reset_empties_store() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.write(&text_file("a.txt", "a")).unwrap();
        store.write(&text_file("b.md", "b")).unwrap();
        store.reset().unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.read("a.txt").unwrap_err(),
            StoreError::NotFound(_)
        ));

        // Store is usable again immediately after a reset
        store.write(&text_file("c.txt", "c")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["c.txt"]);
    }
}
