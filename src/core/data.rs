//! Core data structures for filter definitions
//!
//! Definitions are loaded once at startup and only read afterwards.

use crate::core::traits::DefinitionSource;
use crate::utils::error::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fmt;

/// A named set of path patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    pub name: String,
    pub paths: Vec<String>,
}

/// A named server search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    pub name: String,
    pub query: String,
}

impl ModuleDefinition {
    pub fn new(name: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            name: name.into(),
            paths,
        }
    }

    /// Build a module from a `paths` value separated by commas or newlines
    pub fn from_joined(name: impl Into<String>, joined: &str) -> Self {
        let paths = joined
            .split([',', '\n'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(name, paths)
    }

    /// Paths as the server expects them
    pub fn joined_paths(&self) -> String {
        self.paths.join(",")
    }
}

impl ViewDefinition {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
        }
    }

    /// Build a view from the lines of a flat source file
    pub fn from_lines(name: impl Into<String>, lines: &[String]) -> Self {
        Self::new(name, lines.join(","))
    }
}

/// The two kinds of filter the server knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Module,
    View,
}

impl ItemKind {
    pub fn singular(self) -> &'static str {
        match self {
            ItemKind::Module => "module",
            ItemKind::View => "view",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            ItemKind::Module => "modules",
            ItemKind::View => "views",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// All module and view definitions, keyed by unique name
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    modules: BTreeMap<String, ModuleDefinition>,
    views: BTreeMap<String, ViewDefinition>,
}

impl Definitions {
    /// Merge every source, rejecting names seen before in any of them
    pub fn from_sources(sources: &[Box<dyn DefinitionSource>]) -> AppResult<Self> {
        let mut definitions = Self::default();
        for source in sources {
            tracing::debug!("Loading definitions from {}", source.describe());
            for module in source.modules()? {
                definitions.add_module(module)?;
            }
            for view in source.views()? {
                definitions.add_view(view)?;
            }
        }
        Ok(definitions)
    }

    pub fn add_module(&mut self, module: ModuleDefinition) -> AppResult<()> {
        if self.modules.contains_key(&module.name) {
            return Err(AppError::config(format!(
                "Module '{}' already defined",
                module.name
            )));
        }
        if module.paths.is_empty() {
            return Err(AppError::config(format!(
                "Module '{}' has no paths",
                module.name
            )));
        }

        tracing::debug!(
            "Found module \"{}\" with paths \"{}\"",
            module.name,
            module.joined_paths()
        );
        self.modules.insert(module.name.clone(), module);
        Ok(())
    }

    pub fn add_view(&mut self, view: ViewDefinition) -> AppResult<()> {
        if self.views.contains_key(&view.name) {
            return Err(AppError::config(format!(
                "View '{}' already defined",
                view.name
            )));
        }
        if view.query.trim().is_empty() {
            return Err(AppError::config(format!(
                "View '{}' has an empty query",
                view.name
            )));
        }

        tracing::debug!("Found view \"{}\" with query \"{}\"", view.name, view.query);
        self.views.insert(view.name.clone(), view);
        Ok(())
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.values()
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewDefinition> {
        self.views.values()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource {
        modules: Vec<ModuleDefinition>,
        views: Vec<ViewDefinition>,
    }

    impl DefinitionSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        fn modules(&self) -> AppResult<Vec<ModuleDefinition>> {
            Ok(self.modules.clone())
        }

        fn views(&self) -> AppResult<Vec<ViewDefinition>> {
            Ok(self.views.clone())
        }
    }

    fn source(modules: &[&str], views: &[&str]) -> Box<dyn DefinitionSource> {
        Box::new(StaticSource {
            modules: modules
                .iter()
                .map(|m| ModuleDefinition::new(*m, vec!["src".to_string()]))
                .collect(),
            views: views
                .iter()
                .map(|v| ViewDefinition::new(*v, "severity:1"))
                .collect(),
        })
    }

    #[test]
    fn test_from_joined_trims_and_drops_blanks() {
        let module = ModuleDefinition::from_joined("libcore", " src/a , src/b,,");
        assert_eq!(module.paths, vec!["src/a", "src/b"]);
        assert_eq!(module.joined_paths(), "src/a,src/b");

        let multiline = ModuleDefinition::from_joined("libcore", "src/a,\nsrc/b\r\n src/c");
        assert_eq!(multiline.paths, vec!["src/a", "src/b", "src/c"]);
    }

    #[test]
    fn test_view_from_lines() {
        let lines = vec!["code:NPD.FUNC.MUST".to_string(), "code:ABV.GENERAL".to_string()];
        let view = ViewDefinition::from_lines("critical", &lines);
        assert_eq!(view.query, "code:NPD.FUNC.MUST,code:ABV.GENERAL");
    }

    #[test]
    fn test_merge_sources() {
        let sources = vec![source(&["a", "b"], &["v1"]), source(&["c"], &["v2"])];
        let defs = Definitions::from_sources(&sources).unwrap();
        assert_eq!(defs.module_count(), 3);
        assert_eq!(defs.view_count(), 2);
        let names: Vec<_> = defs.modules().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_module_across_sources() {
        let sources = vec![source(&["a"], &[]), source(&["a"], &[])];
        let err = Definitions::from_sources(&sources).unwrap_err();
        assert_eq!(err, AppError::config("Module 'a' already defined"));
    }

    #[test]
    fn test_duplicate_view_across_sources() {
        let sources = vec![source(&[], &["v"]), source(&[], &["v"])];
        let err = Definitions::from_sources(&sources).unwrap_err();
        assert_eq!(err, AppError::config("View 'v' already defined"));
    }

    #[test]
    fn test_same_name_module_and_view_is_allowed() {
        let sources = vec![source(&["x"], &["x"])];
        let defs = Definitions::from_sources(&sources).unwrap();
        assert_eq!(defs.module_count(), 1);
        assert_eq!(defs.view_count(), 1);
    }

    #[test]
    fn test_rejects_empty_values() {
        let mut defs = Definitions::default();
        assert!(matches!(
            defs.add_module(ModuleDefinition::new("m", vec![])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            defs.add_view(ViewDefinition::new("v", "  ")),
            Err(AppError::Config(_))
        ));
        assert_eq!(defs.module_count() + defs.view_count(), 0);
    }
}
