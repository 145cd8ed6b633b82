//! Interactive terminal prompts
//!
//! Line editing and in-session history come from `rustyline`. Ctrl-C and
//! Ctrl-D end a prompt the same way: the caller sees `None` and backs out.

use crate::config::ConfigAnswers;
use crate::error::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Questions asked on the terminal
pub struct Prompt {
    editor: DefaultEditor,
}

impl Prompt {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    /// Ask a question; `None` when the user interrupts or closes input
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let answer = read_answer(self.editor.readline(&format!("{question}: ")))?;
        if let Some(line) = answer.as_deref().filter(|l| !l.is_empty()) {
            let _ = self.editor.add_history_entry(line);
        }
        Ok(answer)
    }

    /// Ask with a default shown in brackets
    ///
    /// `Some(None)` means the default was kept with a blank answer.
    pub fn ask_or_default(&mut self, question: &str, default: &str) -> Result<Option<Option<String>>> {
        let answer = self.ask(&format!("{question} [{default}]"))?;
        Ok(answer.map(|a| Some(a).filter(|a| !a.is_empty())))
    }

    /// Yes/no question defaulting to no
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]"))?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }
}

/// Trimmed line, or `None` on Ctrl-C / Ctrl-D
fn read_answer(line: rustyline::Result<String>) -> Result<Option<String>> {
    match line {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// What the analytics menu does with one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Quit,
    Run(usize),
    /// Not a number; the text is echoed back
    Invalid(String),
}

pub fn menu_choice(answer: Option<&str>) -> MenuChoice {
    match answer.map(str::trim) {
        None | Some("") => MenuChoice::Quit,
        Some(a) if a.eq_ignore_ascii_case("q") => MenuChoice::Quit,
        Some(a) => a
            .parse()
            .map_or_else(|_| MenuChoice::Invalid(a.to_string()), MenuChoice::Run),
    }
}

/// Ask for every config override; `None` if the user backs out
pub fn ask_config_answers(prompt: &mut Prompt) -> Result<Option<ConfigAnswers>> {
    let Some(region) = prompt.ask_or_default("AWS region", "us-west-2")? else {
        return Ok(None);
    };
    let Some(cluster_identifier) = prompt.ask_or_default("Cluster identifier", "sparkify-cluster")?
    else {
        return Ok(None);
    };
    let Some(db_name) = prompt.ask_or_default("Database name", "dwh")? else {
        return Ok(None);
    };
    let Some(db_user) = prompt.ask_or_default("Database user", "sparkifier")? else {
        return Ok(None);
    };
    let Some(db_password) = prompt.ask_or_default("Database password", "Passw0rd")? else {
        return Ok(None);
    };
    let Some(role_name) = prompt.ask_or_default("IAM role name", "sparkify_redshift_role")? else {
        return Ok(None);
    };

    Ok(Some(ConfigAnswers {
        region,
        cluster_identifier,
        db_name,
        db_user,
        db_password,
        role_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_interrupt_and_eof_back_out() {
        assert_eq!(read_answer(Err(ReadlineError::Interrupted)).unwrap(), None);
        assert_eq!(read_answer(Err(ReadlineError::Eof)).unwrap(), None);
    }

    #[test]
    fn test_answer_is_trimmed() {
        assert_eq!(
            read_answer(Ok("  3 \n".to_string())).unwrap(),
            Some("3".to_string())
        );
    }

    #[test]
    fn test_terminal_failure_is_an_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = read_answer(Err(ReadlineError::Io(io))).unwrap_err();
        assert!(matches!(err, Error::Readline(_)));
    }

    #[test_case("y", true ; "short")]
    #[test_case("YES", true ; "upper")]
    #[test_case("n", false ; "no")]
    #[test_case("", false ; "blank")]
    fn test_is_yes(answer: &str, expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }

    #[test_case(None, MenuChoice::Quit ; "interrupted")]
    #[test_case(Some(""), MenuChoice::Quit ; "blank")]
    #[test_case(Some("Q"), MenuChoice::Quit ; "q")]
    #[test_case(Some(" 4 "), MenuChoice::Run(4) ; "number")]
    #[test_case(Some("top"), MenuChoice::Invalid("top".to_string()) ; "text")]
    fn test_menu_choice(answer: Option<&str>, expected: MenuChoice) {
        assert_eq!(menu_choice(answer), expected);
    }
}
