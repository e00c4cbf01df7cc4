use crate::cli::Cli;
use crate::core::traits::DefinitionSource;
use crate::sources::{FileSelector, FlatFileSource, IniSource};
use crate::utils::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings file with defaults for the command line
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub project_filter: Option<String>,
    pub ltoken_file: Option<PathBuf>,
}

impl Config {
    /// Load the default settings file; a missing one yields defaults
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_custom(&path)
    }

    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            return Err(AppError::config(format!(
                "Settings file \"{}\" does not exist",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| AppError::Io(e.to_string()))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::config(format!(
                "Failed to parse settings file \"{}\": {}",
                config_path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(url) = &self.server.url
            && url.trim().is_empty()
        {
            return Err(AppError::config("Server URL cannot be empty"));
        }

        if let Some(user) = &self.server.user
            && user.trim().is_empty()
        {
            return Err(AppError::config("User cannot be empty"));
        }

        Ok(())
    }

    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kwfilters")
            .join("config.toml")
    }
}

/// Which definition sources were requested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSelection {
    pub config_files: Vec<PathBuf>,
    pub modules: Option<FileSelector>,
    pub views: Option<FileSelector>,
}

impl SourceSelection {
    pub fn is_empty(&self) -> bool {
        self.config_files.is_empty() && self.modules.is_none() && self.views.is_none()
    }

    /// Open every source; structured files first, then the flat selectors
    pub fn open(&self) -> AppResult<Vec<Box<dyn DefinitionSource>>> {
        let mut sources: Vec<Box<dyn DefinitionSource>> = Vec::new();
        for file in &self.config_files {
            sources.push(Box::new(IniSource::load(file)?));
        }

        let flat = FlatFileSource::new(self.modules.clone(), self.views.clone());
        if !flat.is_empty() {
            sources.push(Box::new(flat));
        }
        Ok(sources)
    }
}

/// Everything a run needs, merged from the command line and the settings file
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub url: String,
    pub user: String,
    pub project_filter: String,
    pub silent: bool,
    pub ltoken_file: Option<PathBuf>,
    pub sources: SourceSelection,
}

impl RunOptions {
    /// Command-line values win over settings file values
    pub fn resolve(cli: &Cli, config: &Config) -> AppResult<Self> {
        let url = cli
            .url
            .clone()
            .or_else(|| config.server.url.clone())
            .ok_or_else(|| AppError::config("No server URL given, use --url"))?;

        let user = cli
            .user
            .clone()
            .or_else(|| config.server.user.clone())
            .or_else(current_user)
            .ok_or_else(|| AppError::config("Cannot determine user name, use --user"))?;

        let project_filter = cli
            .re_project
            .clone()
            .or_else(|| config.server.project_filter.clone())
            .unwrap_or_default();

        let sources = SourceSelection {
            config_files: non_blank(&cli.config_files),
            modules: selector(&non_blank(&cli.module_files), cli.module_dir.as_ref()),
            views: selector(&non_blank(&cli.view_files), cli.view_dir.as_ref()),
        };
        if sources.is_empty() {
            return Err(AppError::config("No module or view definitions given"));
        }

        Ok(Self {
            url,
            user,
            project_filter,
            silent: cli.silent,
            ltoken_file: cli.ltoken.clone().or_else(|| config.server.ltoken_file.clone()),
            sources,
        })
    }
}

fn selector(files: &[PathBuf], dir: Option<&PathBuf>) -> Option<FileSelector> {
    match dir {
        Some(dir) => Some(FileSelector::Dir(dir.clone())),
        None if !files.is_empty() => Some(FileSelector::Files(files.to_vec())),
        None => None,
    }
}

/// Drop the empty entries a stray comma leaves in a file list
fn non_blank(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| !p.as_os_str().is_empty())
        .cloned()
        .collect()
}

fn current_user() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|user| !user.trim().is_empty())
}
