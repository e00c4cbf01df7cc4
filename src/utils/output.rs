use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn project(text: &str) -> ColoredString {
        text.bright_cyan()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red().bold()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }
}

/// Render the project list shown before a mutating phase
pub fn format_project_list(projects: &[String]) -> String {
    if projects.is_empty() {
        return OutputStyle::muted("(no projects)").to_string();
    }

    projects
        .iter()
        .map(|p| format!("  - {}", OutputStyle::project(p)))
        .collect::<Vec<_>>()
        .join("\n")
}
