use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kwfilters")]
#[command(about = "Create or update modules and views on static-analysis server projects")]
#[command(version)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["config_files", "module_files", "module_dir", "view_files", "view_dir"])
))]
pub struct Cli {
    #[arg(long, value_name = "URL", help = "URL of the server, e.g. \"http://kw.server:8080\"")]
    pub url: Option<String>,

    #[arg(long, help = "User name for the server (defaults to the current user)")]
    pub user: Option<String>,

    #[arg(
        long = "re-project",
        value_name = "REGEX",
        help = "Only process projects whose name starts with a match of this expression"
    )]
    pub re_project: Option<String>,

    #[arg(
        long,
        value_name = "FILES",
        value_delimiter = ',',
        value_parser = path_entry,
        help = "Comma separated INI files declaring modules and views"
    )]
    pub config_files: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "FILES",
        value_delimiter = ',',
        value_parser = path_entry,
        conflicts_with = "module_dir",
        help = "Comma separated module files, one path per line"
    )]
    pub module_files: Vec<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory of module files")]
    pub module_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILES",
        value_delimiter = ',',
        value_parser = path_entry,
        conflicts_with = "view_dir",
        help = "Comma separated view files, one query fragment per line"
    )]
    pub view_files: Vec<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory of view files")]
    pub view_dir: Option<PathBuf>,

    #[arg(long, help = "Do not ask before creating/updating")]
    pub silent: bool,

    #[arg(short, long, help = "Provide verbose output")]
    pub verbose: bool,

    #[arg(long, value_name = "FILE", help = "Settings file to use instead of the default one")]
    pub settings: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Login token file (defaults to ~/.klocwork/ltoken)")]
    pub ltoken: Option<PathBuf>,
}

/// One entry of a comma separated file list; blanks are dropped later
fn path_entry(value: &str) -> Result<PathBuf, String> {
    Ok(PathBuf::from(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("kwfilters").chain(args.iter().copied()))
    }

    #[test]
    fn test_config_files_are_comma_separated() {
        let cli = parse(&["--url", "http://kw", "--config-files", "a.ini,b.ini", "--silent"]).unwrap();
        assert_eq!(cli.config_files, vec![PathBuf::from("a.ini"), PathBuf::from("b.ini")]);
        assert!(cli.silent);
        assert!(!cli.verbose);
        assert!(cli.re_project.is_none());
    }

    #[test]
    fn test_trailing_comma_parses() {
        let cli = parse(&["--config-files", "a.ini, b.ini,", "--view-files", "v.txt,"]).unwrap();
        assert_eq!(
            cli.config_files,
            vec![PathBuf::from("a.ini"), PathBuf::from("b.ini"), PathBuf::new()]
        );
        assert_eq!(cli.view_files, vec![PathBuf::from("v.txt"), PathBuf::new()]);
    }

    #[test]
    fn test_a_source_is_required() {
        let err = parse(&["--url", "http://kw"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_module_files_and_dir_conflict() {
        let err = parse(&["--module-files", "a.txt", "--module-dir", "modules"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_view_files_and_dir_conflict() {
        let err = parse(&["--view-files", "a.txt", "--view-dir", "views"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_mixed_kinds_are_allowed() {
        let cli = parse(&["--module-dir", "modules", "--view-files", "a.view,b.view", "-v"]).unwrap();
        assert_eq!(cli.module_dir, Some(PathBuf::from("modules")));
        assert_eq!(cli.view_files.len(), 2);
        assert!(cli.verbose);
    }
}
