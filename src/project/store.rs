//! `project.json`: the on-disk project document.
//!
//! Only the fields the core reads are typed; everything else the document
//! carries (temporary recordings, generator settings, …) is kept verbatim in
//! [`Project::extra`] and written back unchanged on save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::BatchItem;

use super::item::ScriptItem;
use super::source::{processed_filename, SourcePolicy, SourceResolver, PROCESSED_DIR, RAW_DIR};

/// File name of the project document inside the project directory.
pub const PROJECT_FILE: &str = "project.json";

// ---------------------------------------------------------------------------
// ProjectError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no project file at {0}")]
    NotFound(PathBuf),

    #[error("project I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed project file: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_language_mode() -> String {
    "Sinhala".into()
}

fn default_target_sample_rate() -> u32 {
    22_050
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A recording project: metadata plus the ordered script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Project directory.  Overwritten with the actual directory on load.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub created_at: String,
    #[serde(default = "default_language_mode")]
    pub language_mode: String,
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub items: Vec<ScriptItem>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Read `<dir>/project.json`.
    ///
    /// The stored `path` is replaced by `dir`, so a project folder that was
    /// moved or copied still resolves its audio correctly.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let dir = dir.as_ref();
        let file = dir.join(PROJECT_FILE);
        if !file.is_file() {
            return Err(ProjectError::NotFound(file));
        }

        let content = std::fs::read_to_string(&file)?;
        let mut project: Self = serde_json::from_str(&content)?;
        project.path = dir.to_path_buf();

        log::debug!(
            "project: loaded {:?} ({} items) from {}",
            project.name,
            project.items.len(),
            dir.display()
        );
        Ok(project)
    }

    /// Write `project.json` (pretty-printed, two-space indent) into
    /// [`Project::path`].
    pub fn save(&self) -> Result<(), ProjectError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(self.path.join(PROJECT_FILE), content)?;
        Ok(())
    }

    /// Resolver over this project's audio directories.
    pub fn resolver(&self, policy: SourcePolicy) -> SourceResolver {
        SourceResolver::new(&self.path, policy)
    }

    /// Recorded items with their 1-based index in the full list.
    pub fn recorded_items(&self) -> impl Iterator<Item = (usize, &ScriptItem)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_recorded())
            .map(|(i, item)| (i + 1, item))
    }

    /// Batch work list: every recorded item paired with its raw take.
    pub fn batch_items(&self) -> Vec<BatchItem> {
        let resolver = self.resolver(SourcePolicy::PerFile);
        self.recorded_items()
            .map(|(index, item)| BatchItem::new(&item.id, resolver.raw_path(index, item)))
            .collect()
    }

    /// Store the current index-derived filename on every recorded item that
    /// has none, freezing the item-to-file mapping before the list changes.
    ///
    /// Returns how many items were pinned.
    pub fn pin_source_filenames(&mut self) -> usize {
        let mut pinned = 0;
        for (i, item) in self.items.iter_mut().enumerate() {
            if item.is_recorded() && item.source_filename.is_none() {
                item.source_filename = Some(SourceResolver::filename_for(i + 1, item));
                pinned += 1;
            }
        }
        pinned
    }

    /// Remove the item with `id` and delete its audio.
    ///
    /// Filenames of the remaining items are pinned first so their files stay
    /// reachable after the positions shift.  The item's raw take, processed
    /// take and batch output are deleted; files that are already gone are
    /// ignored.  The item leaves the list only once its files are gone, so a
    /// failed deletion keeps it in place.  The document itself is not saved;
    /// call [`Project::save`].
    ///
    /// Returns the removed item, or `None` if no item has that id.
    pub fn delete_item(&mut self, id: &str) -> Result<Option<ScriptItem>, ProjectError> {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };

        self.pin_source_filenames();

        let item = &self.items[pos];
        let name = SourceResolver::filename_for(pos + 1, item);
        let doomed = [
            self.path.join(RAW_DIR).join(&name),
            self.path.join(PROCESSED_DIR).join(&name),
            self.path.join(PROCESSED_DIR).join(processed_filename(&item.id)),
        ];
        for path in &doomed {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("project: deleted {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        let item = self.items.remove(pos);

        if self.current_index >= self.items.len() {
            self.current_index = self.items.len().saturating_sub(1);
        }

        log::info!("project: deleted item {id}");
        Ok(Some(item))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ItemStatus;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
  "id": "b2c1",
  "name": "Demo",
  "path": "C:\\old\\location",
  "createdAt": "2025-01-01T00:00:00.000Z",
  "languageMode": "Singlish",
  "targetSampleRate": 22050,
  "currentIndex": 2,
  "items": [
    { "id": "a", "text": "Sentence 1", "status": "recorded", "duration": 5 },
    { "id": "b", "text": "Sentence 2", "status": "pending", "duration": 0 },
    { "id": "c", "text": "Sentence 3", "status": "recorded", "duration": 3 }
  ],
  "tempRecordings": [],
  "genSettings": { "mainLanguage": "Sinhala", "domain": "news" }
}"#;

    fn write_sample(dir: &Path) {
        std::fs::write(dir.join(PROJECT_FILE), SAMPLE).unwrap();
    }

    fn touch(path: PathBuf) -> PathBuf {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[test]
    fn load_replaces_path_and_reads_items() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());

        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.path, dir.path());
        assert_eq!(project.language_mode, "Singlish");
        assert_eq!(project.items.len(), 3);
        assert_eq!(project.items[1].status, ItemStatus::Pending);
    }

    #[test]
    fn missing_project_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Project::load(dir.path()),
            Err(ProjectError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_project_is_json_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "{ not json").unwrap();
        assert!(matches!(
            Project::load(dir.path()),
            Err(ProjectError::Json(_))
        ));
    }

    #[test]
    fn save_keeps_unknown_fields() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());

        let project = Project::load(dir.path()).unwrap();
        project.save().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(PROJECT_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["genSettings"]["domain"], "news");
        assert!(raw["tempRecordings"].is_array());
        assert_eq!(raw["createdAt"], "2025-01-01T00:00:00.000Z");

        assert_eq!(Project::load(dir.path()).unwrap(), project);
    }

    #[test]
    fn recorded_items_keep_full_list_index() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let project = Project::load(dir.path()).unwrap();

        let indices: Vec<(usize, &str)> = project
            .recorded_items()
            .map(|(i, item)| (i, item.id.as_str()))
            .collect();
        assert_eq!(indices, vec![(1, "a"), (3, "c")]);
    }

    #[test]
    fn batch_items_point_at_raw_takes() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let project = Project::load(dir.path()).unwrap();

        let batch = project.batch_items();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].id, "c");
        assert_eq!(batch[1].file_path, dir.path().join(RAW_DIR).join("file_0003.wav"));
    }

    #[test]
    fn pinning_is_idempotent() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let mut project = Project::load(dir.path()).unwrap();

        assert_eq!(project.pin_source_filenames(), 2);
        assert_eq!(project.pin_source_filenames(), 0);
        assert_eq!(project.items[2].source_filename.as_deref(), Some("file_0003.wav"));
        assert!(project.items[1].source_filename.is_none());
    }

    #[test]
    fn delete_item_removes_files_and_keeps_later_mappings() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let raw1 = touch(dir.path().join(RAW_DIR).join("file_0001.wav"));
        let out1 = touch(dir.path().join(PROCESSED_DIR).join("processed_a.wav"));
        let raw3 = touch(dir.path().join(RAW_DIR).join("file_0003.wav"));

        let mut project = Project::load(dir.path()).unwrap();
        let removed = project.delete_item("a").unwrap().unwrap();
        assert_eq!(removed.id, "a");

        assert!(!raw1.exists());
        assert!(!out1.exists());
        assert!(raw3.exists());

        // "c" is now second in the list but still resolves to file_0003.wav.
        let resolver = project.resolver(SourcePolicy::PerFile);
        let (index, item) = project.recorded_items().next().unwrap();
        assert_eq!(index, 2);
        assert_eq!(resolver.resolve(index, item), Some(raw3));
        assert_eq!(project.current_index, 1);
    }

    #[test]
    fn failed_file_deletion_keeps_item() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let mut project = Project::load(dir.path()).unwrap();
        let before = project.items.len();
        let (pos, id) = project
            .items
            .iter()
            .enumerate()
            .find(|(_, item)| item.is_recorded())
            .map(|(i, item)| (i, item.id.clone()))
            .unwrap();

        // A directory where the raw take should be cannot be unlinked.
        let name = SourceResolver::filename_for(pos + 1, &project.items[pos]);
        std::fs::create_dir_all(dir.path().join(RAW_DIR).join(name)).unwrap();

        assert!(matches!(project.delete_item(&id), Err(ProjectError::Io(_))));
        assert_eq!(project.items.len(), before);
        assert_eq!(project.items[pos].id, id);
    }

    #[test]
    fn delete_unknown_item_is_noop() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let mut project = Project::load(dir.path()).unwrap();

        assert!(project.delete_item("zzz").unwrap().is_none());
        assert_eq!(project.items.len(), 3);
        assert!(project.items[0].source_filename.is_none());
    }
}
