use crate::core::data::ItemKind;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::{OutputStyle, format_project_list};
use std::io::{self, BufRead, Write};

/// Source of operator answers
pub trait Prompter {
    /// Show `prompt` and return the raw answer, or `None` when input is closed
    fn ask(&mut self, prompt: &str) -> AppResult<Option<String>>;
}

/// Reads answers from stdin
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&mut self, prompt: &str) -> AppResult<Option<String>> {
        let stdin = io::stdin();
        prompt_input(&mut stdin.lock(), &mut io::stdout(), prompt)
    }
}

pub fn prompt_input<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> AppResult<Option<String>> {
    write!(output, "{}", prompt).map_err(|e| AppError::Io(e.to_string()))?;
    output.flush().map_err(|e| AppError::Io(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::Io(e.to_string()))?;
    if read == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

/// Only an explicit `Y` counts as consent
pub fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Asks before each mutating phase unless running silent
pub struct ConfirmationGate {
    silent: bool,
    prompter: Box<dyn Prompter>,
}

impl ConfirmationGate {
    pub fn new(silent: bool, prompter: Box<dyn Prompter>) -> Self {
        Self { silent, prompter }
    }

    pub fn console(silent: bool) -> Self {
        Self::new(silent, Box::new(ConsolePrompter))
    }

    pub fn approve(&mut self, kind: ItemKind, projects: &[String]) -> AppResult<bool> {
        if self.silent {
            return Ok(true);
        }

        let prompt = format!(
            "\n{}\n{}\n{} [Y/N] ",
            OutputStyle::header(&format!(
                "The following projects will have their {} created/updated:",
                kind.plural()
            )),
            format_project_list(projects),
            OutputStyle::warning(&format!(
                "Are you sure you want to create/update {} for these projects?",
                kind.plural()
            )),
        );

        let answer = self.prompter.ask(&prompt)?;
        Ok(answer.as_deref().is_some_and(is_confirmation))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Replays canned answers, then reports closed input
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, _prompt: &str) -> AppResult<Option<String>> {
            Ok(self.answers.pop_front())
        }
    }

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("Y"));
        assert!(is_confirmation("y"));
        assert!(is_confirmation("  y \n"));
        assert!(!is_confirmation("yes"));
        assert!(!is_confirmation("N"));
        assert!(!is_confirmation(""));
    }

    #[test]
    fn test_prompt_input_trims_and_detects_eof() {
        let mut out = Vec::new();
        let mut input = Cursor::new("  Y \n");
        let answer = prompt_input(&mut input, &mut out, "Proceed? ").unwrap();
        assert_eq!(answer.as_deref(), Some("Y"));
        assert_eq!(String::from_utf8(out).unwrap(), "Proceed? ");

        let mut empty = Cursor::new("");
        let answer = prompt_input(&mut empty, &mut Vec::new(), "Proceed? ").unwrap();
        assert_eq!(answer, None);
    }

    #[test]
    fn test_gate_silent_skips_prompt() {
        let mut gate = ConfirmationGate::new(true, Box::new(ScriptedPrompter::new(&[])));
        assert!(gate.approve(ItemKind::Module, &["proj1".to_string()]).unwrap());
    }

    #[test]
    fn test_gate_declines_on_anything_but_y() {
        let projects = vec!["proj1".to_string()];

        let mut gate = ConfirmationGate::new(false, Box::new(ScriptedPrompter::new(&["n"])));
        assert!(!gate.approve(ItemKind::View, &projects).unwrap());

        let mut gate = ConfirmationGate::new(false, Box::new(ScriptedPrompter::new(&["yes"])));
        assert!(!gate.approve(ItemKind::View, &projects).unwrap());

        // closed stdin
        let mut gate = ConfirmationGate::new(false, Box::new(ScriptedPrompter::new(&[])));
        assert!(!gate.approve(ItemKind::View, &projects).unwrap());

        let mut gate = ConfirmationGate::new(false, Box::new(ScriptedPrompter::new(&["y"])));
        assert!(gate.approve(ItemKind::View, &projects).unwrap());
    }
}
