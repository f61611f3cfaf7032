//! The console loop
//!
//! One command at a time: read a line at the current menu node, move
//! through the tree or dispatch a leaf, and report failures as a single
//! `error: ...` line.

use std::io::Write;
use std::sync::Arc;

use crate::core::{parse_command, Command, ConsoleError, ConsoleResult, SessionContext};
use crate::domain::abi::ContractInterface;
use crate::domain::contract::{ContractBinding, GasOracle, Interrupt};
use crate::modules::{contract, events, signer};
use crate::ui::{BuiltinCommand, Choices, LeafAction, Line, LineInput, MenuTree, NodeId, Prompter};

/// Whether the loop keeps going after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Capabilities the console drives
#[derive(Clone)]
pub struct Backends {
    pub binding: Arc<dyn ContractBinding>,
    pub gas: Arc<dyn GasOracle>,
    pub interrupt: Arc<dyn Interrupt>,
}

pub struct App<L, W> {
    tree: MenuTree,
    current: NodeId,
    interface: ContractInterface,
    ctx: SessionContext,
    prompter: Prompter<L, W>,
    backends: Backends,
}

impl<L: LineInput, W: Write> App<L, W> {
    pub fn new(
        interface: ContractInterface,
        ctx: SessionContext,
        prompter: Prompter<L, W>,
        backends: Backends,
    ) -> Self {
        let tree = MenuTree::build(&interface);
        let current = tree.root();
        Self {
            tree,
            current,
            interface,
            ctx,
            prompter,
            backends,
        }
    }

    /// Breadcrumb path of the current node
    pub fn location(&self) -> String {
        self.tree.name(self.current)
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn prompter(&self) -> &Prompter<L, W> {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut Prompter<L, W> {
        &mut self.prompter
    }

    /// Run until `exit` or end of input
    pub async fn run(&mut self) -> ConsoleResult<()> {
        while self.step().await? == Flow::Continue {}
        Ok(())
    }

    /// Read and handle one menu line
    ///
    /// Only a failing terminal escapes; command errors are printed.
    pub async fn step(&mut self) -> ConsoleResult<Flow> {
        let prompt = format!("{}> ", self.location());
        let completion = Choices(self.tree.completer(self.current, ""));
        let line = match self
            .prompter
            .input_mut()
            .read_line(&prompt, Box::new(completion))?
        {
            Line::Text(line) => line,
            // Ctrl-C only clears the line here
            Line::Interrupted => return Ok(Flow::Continue),
            Line::Eof => return Ok(Flow::Exit),
        };

        match parse_command(&line) {
            Command::Blank => Ok(Flow::Continue),
            Command::Exit => Ok(Flow::Exit),
            Command::Help => {
                self.show_help();
                Ok(Flow::Continue)
            }
            Command::Up => {
                self.go_up();
                Ok(Flow::Continue)
            }
            Command::Entry(name) => match self.tree.child_named(self.current, &name) {
                Some(child) if self.tree.has_children(child) => {
                    self.current = child;
                    Ok(Flow::Continue)
                }
                Some(child) => {
                    let action = self.tree.node(child).action.clone();
                    Ok(self.dispatch(action).await)
                }
                None => {
                    self.prompter.say(format!("unknown command: {name}"));
                    Ok(Flow::Continue)
                }
            },
        }
    }

    fn show_help(&mut self) {
        for line in self.tree.help(self.current) {
            self.prompter.say(line);
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.tree.parent(self.current) {
            self.current = parent;
        }
    }

    async fn dispatch(&mut self, action: LeafAction) -> Flow {
        let result = match action {
            LeafAction::Builtin(BuiltinCommand::Exit) => return Flow::Exit,
            LeafAction::Builtin(BuiltinCommand::Up) => {
                self.go_up();
                Ok(())
            }
            LeafAction::Builtin(BuiltinCommand::Help) => {
                self.show_help();
                Ok(())
            }
            LeafAction::Builtin(BuiltinCommand::SignerKey) => {
                signer::configure_key(&mut self.prompter, &mut self.ctx).map(drop)
            }
            LeafAction::Builtin(BuiltinCommand::SignerShow) => {
                signer::show_signer(&mut self.prompter, &self.ctx);
                Ok(())
            }
            LeafAction::ConstantCall(key) => self.call_constant(&key).await,
            LeafAction::Transaction(key) => self.transact(&key).await,
            LeafAction::EventList(key) => self.list_events(&key).await,
            LeafAction::EventWatch(key) => self.watch_events(&key).await,
            LeafAction::None => Ok(()),
        };

        if let Err(err) = result {
            self.report(err);
        }
        Flow::Continue
    }

    async fn call_constant(&mut self, key: &str) -> ConsoleResult<()> {
        let method = self
            .interface
            .method(key)
            .ok_or_else(|| unknown("method", key))?;
        contract::call_constant(&mut self.prompter, self.backends.binding.as_ref(), method)
            .await
            .map(drop)
    }

    async fn transact(&mut self, key: &str) -> ConsoleResult<()> {
        let method = self
            .interface
            .method(key)
            .ok_or_else(|| unknown("method", key))?;
        contract::transact(
            &mut self.prompter,
            self.backends.binding.as_ref(),
            self.backends.gas.as_ref(),
            &self.ctx,
            method,
        )
        .await
        .map(drop)
    }

    async fn list_events(&mut self, key: &str) -> ConsoleResult<()> {
        let event = self
            .interface
            .event(key)
            .ok_or_else(|| unknown("event", key))?;
        events::list_events(&mut self.prompter, self.backends.binding.as_ref(), event)
            .await
            .map(drop)
    }

    async fn watch_events(&mut self, key: &str) -> ConsoleResult<()> {
        let event = self
            .interface
            .event(key)
            .ok_or_else(|| unknown("event", key))?;
        events::watch_events(
            &mut self.prompter,
            self.backends.binding.as_ref(),
            self.backends.interrupt.as_ref(),
            event,
        )
        .await
        .map(drop)
    }

    fn report(&mut self, err: ConsoleError) {
        // cancelled prompts have already said so
        if err.is_aborted() {
            return;
        }
        tracing::debug!(location = %self.location(), "command failed: {err:?}");
        self.prompter.say(format!("error: {err}"));
    }
}

fn unknown(kind: &'static str, name: &str) -> ConsoleError {
    ConsoleError::UnknownMember {
        kind,
        name: name.to_string(),
    }
}
