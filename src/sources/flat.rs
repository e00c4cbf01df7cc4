//! Per-item text files
//!
//! One file per item: the base name (without extension) is the item name
//! and every non-blank line is a path (modules) or a query fragment (views).

use crate::core::data::{ModuleDefinition, ViewDefinition};
use crate::core::traits::DefinitionSource;
use crate::utils::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the files for one item kind come from
#[derive(Debug, Clone, PartialEq)]
pub enum FileSelector {
    Files(Vec<PathBuf>),
    Dir(PathBuf),
}

impl FileSelector {
    /// Resolve to the list of files, checking that each one exists
    pub fn resolve(&self) -> AppResult<Vec<PathBuf>> {
        match self {
            FileSelector::Files(files) => {
                for file in files {
                    if !file.is_file() {
                        return Err(AppError::config(format!(
                            "File \"{}\" does not exist",
                            file.display()
                        )));
                    }
                }
                Ok(files.clone())
            }
            FileSelector::Dir(dir) => {
                if !dir.is_dir() {
                    return Err(AppError::config(format!(
                        "Directory \"{}\" does not exist",
                        dir.display()
                    )));
                }
                let entries = fs::read_dir(dir).map_err(|e| {
                    AppError::Io(format!("Failed to list {}: {}", dir.display(), e))
                })?;

                let mut files = Vec::new();
                for entry in entries {
                    let path = entry
                        .map_err(|e| AppError::Io(format!("Failed to list {}: {}", dir.display(), e)))?
                        .path();
                    if path.is_file() {
                        files.push(path);
                    }
                }
                files.sort();
                Ok(files)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            FileSelector::Files(files) => format!("{} file(s)", files.len()),
            FileSelector::Dir(dir) => format!("directory \"{}\"", dir.display()),
        }
    }
}

/// One item read from a flat file
#[derive(Debug, Clone, PartialEq)]
pub struct FlatItem {
    pub name: String,
    pub lines: Vec<String>,
}

pub fn read_item(path: &Path) -> AppResult<FlatItem> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::config(format!("Cannot derive an item name from \"{}\"", path.display()))
        })?
        .to_string();

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Ok(FlatItem { name, lines })
}

/// Module and view files, selected independently
#[derive(Debug, Clone, Default)]
pub struct FlatFileSource {
    modules: Option<FileSelector>,
    views: Option<FileSelector>,
}

impl FlatFileSource {
    pub fn new(modules: Option<FileSelector>, views: Option<FileSelector>) -> Self {
        Self { modules, views }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_none() && self.views.is_none()
    }

    fn read_items(selector: Option<&FileSelector>) -> AppResult<Vec<FlatItem>> {
        let Some(selector) = selector else {
            return Ok(Vec::new());
        };
        selector.resolve()?.iter().map(|path| read_item(path)).collect()
    }
}

impl DefinitionSource for FlatFileSource {
    fn describe(&self) -> String {
        let part = |label: &str, selector: &Option<FileSelector>| {
            selector
                .as_ref()
                .map(|s| format!("{} from {}", label, s.describe()))
        };
        [part("modules", &self.modules), part("views", &self.views)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        Ok(Self::read_items(self.modules.as_ref())?
            .into_iter()
            .map(|item| ModuleDefinition::new(item.name, item.lines))
            .collect())
    }

    fn views(&self) -> AppResult<Vec<ViewDefinition>> {
        Ok(Self::read_items(self.views.as_ref())?
            .into_iter()
            .map(|item| ViewDefinition::from_lines(item.name, &item.lines))
            .collect())
    }
}
