//! Interactive prompt primitives
//!
//! Every primitive blocks until the operator answers. Cancelling (`..`
//! where accepted, Ctrl-C or Ctrl-D) prints `aborted` and returns
//! [`ConsoleError::Aborted`], which callers propagate with `?`.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy::primitives::U256;
use alloy_dyn_abi::{DynSolType, DynSolValue};

use super::path::{DirectoryListing, PathCompletion};
use crate::core::command::{HELP, UP};
use crate::core::{ConsoleError, ConsoleResult};

/// One answer from the line-input capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D
    Eof,
}

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

/// Completion source queried with the text before the cursor
pub trait Completion {
    fn complete(&self, line: &str) -> Vec<Suggestion>;
}

/// Fixed candidates filtered by prefix
#[derive(Debug, Clone, Default)]
pub struct Choices(pub Vec<Suggestion>);

impl Completion for Choices {
    fn complete(&self, line: &str) -> Vec<Suggestion> {
        self.0
            .iter()
            .filter(|s| s.text.starts_with(line))
            .cloned()
            .collect()
    }
}

/// Line editing capability
pub trait LineInput {
    fn read_line(&mut self, prompt: &str, completion: Box<dyn Completion>) -> io::Result<Line>;

    /// Read without echoing anything
    fn read_password(&mut self, prompt: &str) -> io::Result<Line>;
}

/// Prompt primitives over a line input and an output writer
pub struct Prompter<L, W> {
    input: L,
    out: W,
    listing: Arc<dyn DirectoryListing>,
}

impl<L: LineInput, W: Write> Prompter<L, W> {
    pub fn new(input: L, out: W, listing: Arc<dyn DirectoryListing>) -> Self {
        Self {
            input,
            out,
            listing,
        }
    }

    pub fn input_mut(&mut self) -> &mut L {
        &mut self.input
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Print one line of operator output
    pub fn say(&mut self, text: impl Display) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!("cannot write to terminal: {err}");
        }
    }

    /// Read one line; interrupt and end of input cancel
    pub fn line(&mut self, prompt: &str, completion: Box<dyn Completion>) -> ConsoleResult<String> {
        match self.input.read_line(prompt, completion)? {
            Line::Text(text) => Ok(text),
            Line::Interrupted | Line::Eof => Err(self.abort()),
        }
    }

    fn abort(&mut self) -> ConsoleError {
        self.say("aborted");
        ConsoleError::Aborted
    }

    /// `prompt (yes): ` / `prompt (no): `
    pub fn yes_no(&mut self, prompt: &str, default: bool) -> ConsoleResult<bool> {
        let default = if default { "yes" } else { "no" };
        let answer = self.choose(prompt, default, &["no", "yes"], |p, choices| {
            p.say(format!("one of: {}", choices.join(", ")));
        })?;
        Ok(answer == "yes")
    }

    /// Pick one of `choices`; blank selects `default`
    pub fn choose<F>(
        &mut self,
        prompt: &str,
        default: &str,
        choices: &[&str],
        help: F,
    ) -> ConsoleResult<String>
    where
        F: Fn(&mut Self, &[&str]),
    {
        let rendered = format!("{prompt} ({default}): ");
        loop {
            let mut candidates: Vec<Suggestion> =
                choices.iter().map(|c| Suggestion::new(*c, "")).collect();
            candidates.push(Suggestion::new(UP, "abort"));
            candidates.push(Suggestion::new(HELP, "list choices"));

            let answer = self.line(&rendered, Box::new(Choices(candidates)))?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default.to_string());
            }
            if answer == UP {
                return Err(self.abort());
            }
            if answer == HELP {
                help(self, choices);
                continue;
            }
            if choices.contains(&answer) {
                return Ok(answer.to_string());
            }
            self.say(format!("invalid choice: {answer}"));
        }
    }

    /// Free text, no validation
    pub fn text(&mut self, prompt: &str) -> ConsoleResult<String> {
        self.line(prompt, Box::new(Choices::default()))
    }

    /// Integer; blank selects `default`, `..` cancels
    pub fn int_with_default(&mut self, prompt: &str, default: i64) -> ConsoleResult<i64> {
        loop {
            let answer = self.text(prompt)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            if answer == UP {
                return Err(self.abort());
            }
            match answer.parse::<i64>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(format!("\"{answer}\" is not a number")),
            }
        }
    }

    /// Unsigned 256-bit integer; asks again until one parses
    pub fn big_int(&mut self, prompt: &str) -> ConsoleResult<U256> {
        loop {
            let answer = self.text(prompt)?;
            let answer = answer.trim();
            if answer.is_empty() {
                continue;
            }
            match parse_big(answer) {
                Some(value) => return Ok(value),
                None => self.say(format!("\"{answer}\" is not a number")),
            }
        }
    }

    /// Unsigned 256-bit integer; blank selects `default`
    pub fn big_int_with_default(&mut self, prompt: &str, default: U256) -> ConsoleResult<U256> {
        loop {
            let answer = self.text(prompt)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match parse_big(answer) {
                Some(value) => return Ok(value),
                None => self.say(format!("\"{answer}\" is not a number")),
            }
        }
    }

    /// File path completed from `base`; blank cancels
    pub fn path(&mut self, prompt: &str, base: &Path, must_exist: bool) -> ConsoleResult<PathBuf> {
        let completion = PathCompletion::new(base, Arc::clone(&self.listing));
        let answer = self.line(prompt, Box::new(completion))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(self.abort());
        }

        let path = base.join(answer);
        if must_exist {
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => {
                    return Err(ConsoleError::PathError(format!(
                        "{} is a directory",
                        path.display()
                    )))
                }
                Ok(_) => {}
                Err(_) => {
                    return Err(ConsoleError::PathError(format!(
                        "{} does not exist",
                        path.display()
                    )))
                }
            }
        }
        Ok(path)
    }

    /// Masked secret
    pub fn password(&mut self, prompt: &str) -> ConsoleResult<String> {
        match self.input.read_password(prompt)? {
            Line::Text(text) => Ok(text),
            Line::Interrupted | Line::Eof => Err(self.abort()),
        }
    }
}

/// Decimal, `0x` hex, or a number with a unit suffix (`1ether`, `2gwei`)
fn parse_big(text: &str) -> Option<U256> {
    match DynSolType::Uint(256).coerce_str(text) {
        Ok(DynSolValue::Uint(value, _)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct NoListing;

    impl DirectoryListing for NoListing {
        fn list(&self, _dir: &Path) -> Vec<PathBuf> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct Script {
        lines: VecDeque<Line>,
        prompts: Vec<String>,
    }

    impl LineInput for Script {
        fn read_line(&mut self, prompt: &str, _completion: Box<dyn Completion>) -> io::Result<Line> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front().unwrap_or(Line::Eof))
        }

        fn read_password(&mut self, prompt: &str) -> io::Result<Line> {
            self.read_line(prompt, Box::new(Choices::default()))
        }
    }

    fn prompter(lines: &[&str]) -> Prompter<Script, Vec<u8>> {
        let script = Script {
            lines: lines.iter().map(|l| Line::Text(l.to_string())).collect(),
            prompts: Vec::new(),
        };
        Prompter::new(script, Vec::new(), Arc::new(NoListing))
    }

    fn output(p: &Prompter<Script, Vec<u8>>) -> String {
        String::from_utf8(p.output().clone()).unwrap()
    }

    #[test]
    fn test_yes_no_default_and_prompt() {
        let mut p = prompter(&[""]);
        assert!(p.yes_no("estimate gas price?", true).unwrap());
        assert_eq!(p.input_mut().prompts, vec!["estimate gas price? (yes): "]);
    }

    #[test]
    fn test_choose_rejects_then_accepts() {
        let mut p = prompter(&["maybe", "help", "yes"]);
        assert!(p.yes_no("continue?", false).unwrap());
        let out = output(&p);
        assert!(out.contains("invalid choice: maybe"));
        assert!(out.contains("one of: no, yes"));
        assert_eq!(p.input_mut().prompts.len(), 3);
    }

    #[test]
    fn test_choose_up_aborts() {
        let mut p = prompter(&[".."]);
        let err = p.yes_no("continue?", false).unwrap_err();
        assert!(err.is_aborted());
        assert_eq!(output(&p), "aborted\n");
    }

    #[test]
    fn test_interrupt_cancels() {
        let mut p = prompter(&[]);
        p.input_mut().lines.push_back(Line::Interrupted);
        assert!(p.text("name: ").unwrap_err().is_aborted());
    }

    #[test]
    fn test_int_with_default() {
        let mut p = prompter(&["", "abc", "-1"]);
        assert_eq!(p.int_with_default("start block (0): ", 0).unwrap(), 0);
        assert_eq!(p.int_with_default("end block (last, -1): ", -1).unwrap(), -1);
        assert!(output(&p).contains("\"abc\" is not a number"));

        let mut p = prompter(&[".."]);
        assert!(p.int_with_default("gas limit (0): ", 0).unwrap_err().is_aborted());
    }

    #[test]
    fn test_big_int_retries_until_valid() {
        let mut p = prompter(&["", "lots", "1gwei"]);
        assert_eq!(p.big_int("amount: ").unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(p.input_mut().prompts.len(), 3);
    }

    #[test]
    fn test_big_int_with_default() {
        let mut p = prompter(&["", "0x10"]);
        let default = U256::from(7);
        assert_eq!(p.big_int_with_default("gas price (7): ", default).unwrap(), default);
        assert_eq!(
            p.big_int_with_default("gas price (7): ", default).unwrap(),
            U256::from(16)
        );
    }

    #[test]
    fn test_path_checks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("key.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut p = prompter(&["key.json", "sub", "missing", ""]);
        assert_eq!(
            p.path("key file: ", dir.path(), true).unwrap(),
            dir.path().join("key.json")
        );
        assert!(matches!(
            p.path("key file: ", dir.path(), true),
            Err(ConsoleError::PathError(_))
        ));
        assert!(matches!(
            p.path("key file: ", dir.path(), true),
            Err(ConsoleError::PathError(_))
        ));
        assert!(p.path("key file: ", dir.path(), true).unwrap_err().is_aborted());
    }

    #[test]
    fn test_choices_completion() {
        let choices = Choices(vec![Suggestion::new("no", ""), Suggestion::new("yes", "")]);
        let found: Vec<_> = choices.complete("y").into_iter().map(|s| s.text).collect();
        assert_eq!(found, vec!["yes"]);
    }
}
