//! Structure detection for extracted modules.
//!
//! Classifies a directory tree by file names alone. Files are visited in
//! lexical order of their `/`-joined relative path, and the last classifying
//! file in that order decides the module type and entry point.

use crate::config::PathsConfig;
use crate::{ModdockError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

const PYTHON_ENTRY_POINTS: &[&str] = &["main.py", "app.py", "__main__.py"];
const WEB_ENTRY_POINTS: &[&str] = &["index.html", "index.htm"];
const DEPENDENCY_MANIFESTS: &[&str] = &["requirements.txt"];
const CONFIG_FILES: &[&str] = &["config.json", "config.yaml", "config.yml", "settings.json"];

/// Detected kind of module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    PythonApp,
    WebFrontend,
    #[default]
    Unknown,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::PythonApp => "python_app",
            ModuleType::WebFrontend => "web_frontend",
            ModuleType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying a module directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModuleStructure {
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub entry_point: Option<String>,
    pub has_requirements: bool,
    pub has_config: bool,
    /// Every file, relative to the module root, in traversal order.
    pub files: Vec<String>,
}

/// A file found under a module root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeEntry {
    /// Bare file name.
    pub name: String,
    /// Path relative to the root, `/` separated.
    pub path: String,
    /// Number of directories between the root and the file.
    pub level: usize,
}

/// What a single file says about its module.
enum FileRole {
    PythonEntry,
    WebEntry,
    DependencyManifest,
    Config,
    Plain,
}

fn classify(file_name: &str) -> FileRole {
    if PYTHON_ENTRY_POINTS.contains(&file_name) {
        FileRole::PythonEntry
    } else if WEB_ENTRY_POINTS.contains(&file_name) {
        FileRole::WebEntry
    } else if DEPENDENCY_MANIFESTS.contains(&file_name) {
        FileRole::DependencyManifest
    } else if CONFIG_FILES.contains(&file_name) {
        FileRole::Config
    } else {
        FileRole::Plain
    }
}

/// List every regular file under `root`, sorted by relative path.
///
/// The reserved metadata file at the module root is skipped. Symlinks are
/// not followed.
pub fn list_files(root: &Path) -> Result<Vec<FileTreeEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| ModdockError::Io {
            message: format!("Failed to walk {}: {}", root.display(), e),
            path: e.path().map(|p| p.to_path_buf()),
            source: None,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let components: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        if components.len() == 1 && components[0] == PathsConfig::METADATA_FILENAME {
            continue;
        }

        files.push(FileTreeEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: components.join("/"),
            level: components.len() - 1,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Classify the module rooted at `root`.
pub fn detect_structure(root: &Path) -> Result<ModuleStructure> {
    let mut structure = ModuleStructure::default();

    for file in list_files(root)? {
        match classify(&file.name) {
            FileRole::PythonEntry => {
                structure.module_type = ModuleType::PythonApp;
                structure.entry_point = Some(file.path.clone());
            }
            FileRole::WebEntry => {
                structure.module_type = ModuleType::WebFrontend;
                structure.entry_point = Some(file.path.clone());
            }
            FileRole::DependencyManifest => structure.has_requirements = true,
            FileRole::Config => structure.has_config = true,
            FileRole::Plain => {}
        }
        structure.files.push(file.path);
    }

    Ok(structure)
}
