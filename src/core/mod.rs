pub mod command;
pub mod context;
pub mod error;

pub use command::{parse_command, Command};
pub use context::{SessionContext, Signer};
pub use error::{ConsoleError, ConsoleResult};
