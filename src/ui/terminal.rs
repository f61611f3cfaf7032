//! Line input on a real terminal: rustyline for prompts, crossterm raw
//! mode for masked passwords

use std::io::{self, Write};
use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use super::prompt::{Choices, Completion, Line, LineInput};

/// Bridges a [`Completion`] into rustyline
struct PromptHelper {
    completion: Box<dyn Completion>,
}

impl Completer for PromptHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = line.get(..pos).unwrap_or(line);
        let pairs = self
            .completion
            .complete(before)
            .into_iter()
            .map(|s| Pair {
                display: if s.description.is_empty() {
                    s.text.clone()
                } else {
                    format!("{}  {}", s.text, s.description)
                },
                replacement: s.text,
            })
            .collect();
        // candidates replace everything before the cursor
        Ok((0, pairs))
    }
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Highlighter for PromptHelper {}

impl Validator for PromptHelper {}

impl Helper for PromptHelper {}

/// Interactive terminal with optional persistent history
pub struct Terminal {
    editor: Editor<PromptHelper, FileHistory>,
    history: Option<PathBuf>,
}

impl Terminal {
    pub fn new(history: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(PromptHelper {
            completion: Box::new(Choices::default()),
        }));

        if let Some(path) = &history {
            if let Err(err) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), "no history loaded: {err}");
            }
        }
        Ok(Self { editor, history })
    }

    fn save_history(&mut self) {
        let Some(path) = &self.history else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(err) = self.editor.save_history(path) {
            tracing::warn!(path = %path.display(), "cannot save history: {err}");
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.save_history();
    }
}

impl LineInput for Terminal {
    fn read_line(&mut self, prompt: &str, completion: Box<dyn Completion>) -> io::Result<Line> {
        self.editor.set_helper(Some(PromptHelper { completion }));
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Line::Text(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
            Err(ReadlineError::Eof) => Ok(Line::Eof),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<Line> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        terminal::enable_raw_mode()?;
        let result = read_masked();
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!("cannot leave raw mode: {err}");
        }
        write!(stdout, "\r\n")?;
        stdout.flush()?;
        result
    }
}

/// Collect key presses until Enter without echoing them
fn read_masked() -> io::Result<Line> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => return Ok(Line::Text(secret)),
            KeyCode::Char('c') if ctrl => return Ok(Line::Interrupted),
            KeyCode::Char('d') if ctrl && secret.is_empty() => return Ok(Line::Eof),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) if !ctrl => secret.push(c),
            _ => {}
        }
    }
}
