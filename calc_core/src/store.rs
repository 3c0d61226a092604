//! # Project Storage
//!
//! The [`ProjectStore`] trait is the load/save contract the session works
//! against. It only moves whole projects in and out; business rules stay in
//! [`crate::state`] and [`crate::session`].
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`] - keeps projects in memory, for tests and embedding
//! - [`FileStore`] - one `.cce` file per project in a directory, plus a
//!   `current` file remembering the selected project

use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::project::Project;
#[cfg(not(target_arch = "wasm32"))]
use crate::project::PROJECT_EXTENSION;

/// Registry entry for one stored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListing {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl From<&Project> for ProjectListing {
    fn from(project: &Project) -> Self {
        ProjectListing {
            id: project.id.clone(),
            name: project.name.clone(),
            code: project.code.clone(),
            created: project.created,
            modified: project.modified,
        }
    }
}

/// Persistence contract for projects.
pub trait ProjectStore {
    /// Load one project. Unknown ids are `ProjectNotFound`.
    fn load(&self, id: &str) -> CalcResult<Project>;

    /// Insert or replace a project.
    fn save(&mut self, project: &Project) -> CalcResult<()>;

    /// Remove a project. Unknown ids are `ProjectNotFound`.
    fn delete(&mut self, id: &str) -> CalcResult<()>;

    /// All stored projects, oldest first.
    fn list(&self) -> CalcResult<Vec<ProjectListing>>;

    /// Id of the selected project, if one was recorded.
    fn load_current_id(&self) -> CalcResult<Option<String>>;

    /// Record the selected project (`None` clears it).
    fn save_current_id(&mut self, id: Option<&str>) -> CalcResult<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    projects: BTreeMap<String, Project>,
    current_id: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, id: &str) -> CalcResult<Project> {
        self.projects
            .get(id)
            .cloned()
            .ok_or_else(|| CalcError::project_not_found(id))
    }

    fn save(&mut self, project: &Project) -> CalcResult<()> {
        self.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> CalcResult<()> {
        self.projects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CalcError::project_not_found(id))
    }

    fn list(&self) -> CalcResult<Vec<ProjectListing>> {
        let mut listings: Vec<ProjectListing> = self.projects.values().map(ProjectListing::from).collect();
        listings.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(listings)
    }

    fn load_current_id(&self) -> CalcResult<Option<String>> {
        Ok(self.current_id.clone())
    }

    fn save_current_id(&mut self, id: Option<&str>) -> CalcResult<()> {
        self.current_id = id.map(str::to_string);
        Ok(())
    }
}

/// Directory of `.cce` project files.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    user_id: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// File holding the selected project id
    const CURRENT_FILE: &'static str = "current";

    /// Open (and create if needed) a project directory.
    pub fn open(dir: impl Into<PathBuf>, user_id: impl Into<String>) -> CalcResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            CalcError::file_error("create directory", dir.display().to_string(), e.to_string())
        })?;
        Ok(FileStore {
            dir,
            user_id: user_id.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's file. Ids must be plain file names.
    pub fn path_for(&self, id: &str) -> CalcResult<PathBuf> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && !id.contains(['/', '\\'])
            && id != Self::CURRENT_FILE;
        if !valid {
            return Err(CalcError::invalid_input("id", id, "Project id is not a valid file name"));
        }
        Ok(self.dir.join(format!("{}.{}", id, PROJECT_EXTENSION)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ProjectStore for FileStore {
    fn load(&self, id: &str) -> CalcResult<Project> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(CalcError::project_not_found(id));
        }
        crate::file_io::load_project(&path)
    }

    fn save(&mut self, project: &Project) -> CalcResult<()> {
        let path = self.path_for(&project.id)?;
        let _lock = crate::file_io::FileLock::acquire(&path, self.user_id.clone())?;
        crate::file_io::save_project(project, &path)
    }

    fn delete(&mut self, id: &str) -> CalcResult<()> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(CalcError::project_not_found(id));
        }
        let _lock = crate::file_io::FileLock::acquire(&path, self.user_id.clone())?;
        fs::remove_file(&path).map_err(|e| {
            CalcError::file_error("delete", path.display().to_string(), e.to_string())
        })
    }

    fn list(&self) -> CalcResult<Vec<ProjectListing>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            CalcError::file_error("list", self.dir.display().to_string(), e.to_string())
        })?;

        let mut listings = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROJECT_EXTENSION) {
                continue;
            }
            match crate::file_io::load_project(&path) {
                Ok(project) => listings.push(ProjectListing::from(&project)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable project file"),
            }
        }
        listings.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(listings)
    }

    fn load_current_id(&self) -> CalcResult<Option<String>> {
        let path = self.dir.join(Self::CURRENT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let id = fs::read_to_string(&path).map_err(|e| {
            CalcError::file_error("read", path.display().to_string(), e.to_string())
        })?;
        let id = id.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    fn save_current_id(&mut self, id: Option<&str>) -> CalcResult<()> {
        let path = self.dir.join(Self::CURRENT_FILE);
        crate::file_io::write_atomic(&path, id.unwrap_or_default().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectInfo;
    use std::env::temp_dir;

    fn project(code: &str) -> Project {
        Project::new(ProjectInfo::new("مشروع", code, "سكني", 100.0, 2))
    }

    fn exercise_store(store: &mut impl ProjectStore) {
        let first = project("A-1");
        let second = project("A-2");
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load(&first.id).unwrap(), first);
        let codes: Vec<String> = store.list().unwrap().into_iter().map(|l| l.code).collect();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains(&"A-1".to_string()));

        assert_eq!(store.load_current_id().unwrap(), None);
        store.save_current_id(Some(&second.id)).unwrap();
        assert_eq!(store.load_current_id().unwrap(), Some(second.id.clone()));
        store.save_current_id(None).unwrap();
        assert_eq!(store.load_current_id().unwrap(), None);

        store.delete(&first.id).unwrap();
        assert_eq!(store.load(&first.id).unwrap_err().error_code(), "PROJECT_NOT_FOUND");
        assert_eq!(store.delete(&first.id).unwrap_err().error_code(), "PROJECT_NOT_FOUND");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        exercise_store(&mut store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store() {
        let dir = temp_dir().join(format!("estimate_store_{}", std::process::id()));
        let mut store = FileStore::open(&dir, "tester").unwrap();
        exercise_store(&mut store);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_rejects_path_ids() {
        let dir = temp_dir().join(format!("estimate_store_ids_{}", std::process::id()));
        let store = FileStore::open(&dir, "tester").unwrap();
        assert!(store.path_for("../escape").is_err());
        assert!(store.path_for("current").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("proj_1712345678901").is_ok());
        let _ = fs::remove_dir_all(&dir);
    }
}
