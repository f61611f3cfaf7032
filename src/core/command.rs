//! Classification of console input lines

/// Menu entry that moves to the parent node
pub const UP: &str = "..";
/// Menu entry that shows help for the current node
pub const HELP: &str = "help";
/// Menu entry that exits the console
pub const EXIT: &str = "exit";

/// A console input line, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Up,
    Blank,
    /// Anything else; matched against the current node's children
    Entry(String),
}

/// Classify a line read at the menu prompt
pub fn parse_command(input: &str) -> Command {
    match input.trim() {
        "" => Command::Blank,
        EXIT => Command::Exit,
        HELP => Command::Help,
        UP => Command::Up,
        other => Command::Entry(other.to_string()),
    }
}
