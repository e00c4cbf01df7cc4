//! Structured definition files
//!
//! Every section is one item. `type` selects module or view, and the item
//! then needs `paths` (comma or newline separated) or `query`. Indented
//! lines continue the previous value. Keys of a `[DEFAULT]` section apply to
//! every other section and `[DEFAULT]` itself is not an item:
//!
//! ```ini
//! [libcore]
//! type = module
//! paths = src/core,src/util
//!
//! [critical]
//! type = view
//! query = severity:1-2
//! ```

use crate::core::data::{ModuleDefinition, ViewDefinition};
use crate::core::traits::DefinitionSource;
use crate::utils::error::{AppError, AppResult};
use ini::{Ini, ParseOption, Properties};
use std::path::{Path, PathBuf};

const DEFAULT_SECTION: &str = "DEFAULT";

/// A parsed INI file, split into modules and views
pub struct IniSource {
    path: PathBuf,
    modules: Vec<ModuleDefinition>,
    views: Vec<ViewDefinition>,
}

impl IniSource {
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::config(format!(
                "Config file \"{}\" does not exist",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> AppResult<Self> {
        // Paths may contain backslashes and quotes, keep values verbatim
        let option = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            enabled_indented_mutiline_value: true,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, option).map_err(|e| {
            AppError::config(format!("Failed to parse \"{}\": {}", path.display(), e))
        })?;

        Self::from_ini(path, &ini)
    }

    fn from_ini(path: &Path, ini: &Ini) -> AppResult<Self> {
        let mut modules = Vec::new();
        let mut views = Vec::new();
        let defaults = ini.section(Some(DEFAULT_SECTION));

        for (section, props) in ini.iter() {
            let Some(section) = section else {
                if props.iter().next().is_some() {
                    return Err(AppError::config(format!(
                        "Found keys outside of any section in \"{}\"",
                        path.display()
                    )));
                }
                continue;
            };
            if section == DEFAULT_SECTION {
                continue;
            }

            let item_type = get_key(props, defaults, "type").ok_or_else(|| {
                AppError::config(format!("Could not find type in section \"{}\"", section))
            })?;

            match item_type.trim() {
                "module" => {
                    let paths = get_key(props, defaults, "paths").ok_or_else(|| {
                        AppError::config(format!("Cannot find paths in module \"{}\"", section))
                    })?;
                    modules.push(ModuleDefinition::from_joined(section, paths));
                }
                "view" => {
                    let query = get_key(props, defaults, "query").ok_or_else(|| {
                        AppError::config(format!("Cannot find query in view \"{}\"", section))
                    })?;
                    let lines: Vec<String> = query
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string)
                        .collect();
                    views.push(ViewDefinition::from_lines(section, &lines));
                }
                other => {
                    return Err(AppError::config(format!(
                        "Type \"{}\" is not module or view in section \"{}\"",
                        other, section
                    )));
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            modules,
            views,
        })
    }
}

/// Look `key` up in the section, then in `[DEFAULT]`
fn get_key<'a>(
    props: &'a Properties,
    defaults: Option<&'a Properties>,
    key: &str,
) -> Option<&'a str> {
    find_key(props, key).or_else(|| defaults.and_then(|d| find_key(d, key)))
}

/// Option names are case-insensitive
fn find_key<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

impl DefinitionSource for IniSource {
    fn describe(&self) -> String {
        format!("config file \"{}\"", self.path.display())
    }

    fn modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        Ok(self.modules.clone())
    }

    fn views(&self) -> AppResult<Vec<ViewDefinition>> {
        Ok(self.views.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::Definitions;
    use std::fs;
    use tempfile::TempDir;

    fn parse(content: &str) -> AppResult<IniSource> {
        IniSource::parse(Path::new("test.ini"), content)
    }

    #[test]
    fn test_parse_modules_and_views() {
        let source = parse(
            "[libcore]\ntype = module\npaths = src/a,src/b\n\n\
             [critical]\nType = view\nQUERY = severity:1-2\n",
        )
        .unwrap();

        let modules = source.modules().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "libcore");
        assert_eq!(modules[0].paths, vec!["src/a", "src/b"]);

        let views = source.views().unwrap();
        assert_eq!(views, vec![ViewDefinition::new("critical", "severity:1-2")]);
    }

    #[test]
    fn test_keeps_backslashes_in_paths() {
        let source = parse("[win]\ntype=module\npaths=C:\\src\\core\n").unwrap();
        assert_eq!(source.modules().unwrap()[0].paths, vec!["C:\\src\\core"]);
    }

    #[test]
    fn test_indented_continuation_lines() {
        let source = parse(
            "[libcore]\ntype = module\npaths = src/a,\n    src/b\n    src/c\n\n\
             [critical]\ntype = view\nquery = severity:1-2\n    code:NPD.FUNC.MUST\n",
        )
        .unwrap();

        assert_eq!(
            source.modules().unwrap()[0].paths,
            vec!["src/a", "src/b", "src/c"]
        );
        assert_eq!(
            source.views().unwrap(),
            vec![ViewDefinition::new(
                "critical",
                "severity:1-2,code:NPD.FUNC.MUST"
            )]
        );
    }

    #[test]
    fn test_default_section_fills_other_sections() {
        let source = parse("[DEFAULT]\ntype = module\n[m]\npaths = a\n[n]\npaths = b\n").unwrap();

        let names: Vec<_> = source
            .modules()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["m", "n"]);
        assert!(source.views().unwrap().is_empty());
    }

    #[test]
    fn test_section_value_wins_over_default() {
        let source = parse(
            "[DEFAULT]\ntype = module\npaths = shared\n\
             [m]\n\
             [critical]\ntype = view\nquery = severity:1\n",
        )
        .unwrap();

        assert_eq!(
            source.modules().unwrap(),
            vec![ModuleDefinition::from_joined("m", "shared")]
        );
        assert_eq!(
            source.views().unwrap(),
            vec![ViewDefinition::new("critical", "severity:1")]
        );
    }

    #[test]
    fn test_missing_type() {
        let err = parse("[libcore]\npaths = src\n").err().unwrap();
        assert_eq!(
            err,
            AppError::config("Could not find type in section \"libcore\"")
        );
    }

    #[test]
    fn test_module_missing_paths() {
        let err = parse("[libcore]\ntype = module\n").err().unwrap();
        assert_eq!(
            err,
            AppError::config("Cannot find paths in module \"libcore\"")
        );
    }

    #[test]
    fn test_view_missing_query() {
        let err = parse("[critical]\ntype = view\npaths = src\n").err().unwrap();
        assert_eq!(err, AppError::config("Cannot find query in view \"critical\""));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse("[thing]\ntype = report\n").err().unwrap();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("\"thing\"")));
    }

    #[test]
    fn test_keys_outside_section() {
        let err = parse("type = module\n[a]\ntype = module\npaths = x\n").err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_duplicate_across_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.ini");
        let second = dir.path().join("second.ini");
        fs::write(&first, "[v]\ntype = view\nquery = a\n").unwrap();
        fs::write(&second, "[v]\ntype = view\nquery = b\n").unwrap();

        let sources: Vec<Box<dyn DefinitionSource>> = vec![
            Box::new(IniSource::load(&first).unwrap()),
            Box::new(IniSource::load(&second).unwrap()),
        ];
        let err = Definitions::from_sources(&sources).unwrap_err();
        assert_eq!(err, AppError::config("View 'v' already defined"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = IniSource::load(&dir.path().join("nope.ini")).err().unwrap();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("nope.ini")));
    }
}
