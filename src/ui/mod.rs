//! Operator-facing input: menu tree, prompt primitives and the terminal

pub mod collect;
pub mod menu;
pub mod path;
pub mod prompt;
pub mod terminal;

pub use collect::{collect_arguments, collect_filters};
pub use menu::{BuiltinCommand, LeafAction, MenuTree, NodeId};
pub use path::{DirectoryListing, PathCompletion};
pub use prompt::{Choices, Completion, Line, LineInput, Prompter, Suggestion};
pub use terminal::Terminal;
