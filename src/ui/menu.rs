//! Command menu built from a contract interface
//!
//! Nodes live in one arena and refer to each other by index. The tree is
//! built once per session and never changes afterwards.

use crate::core::command::{EXIT, HELP, UP};
use crate::domain::abi::ContractInterface;

use super::prompt::Suggestion;

/// Separator between segments of a breadcrumb path
pub const SEPARATOR: &str = "/";

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Console commands that are not contract members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCommand {
    Up,
    Help,
    Exit,
    SignerKey,
    SignerShow,
}

/// What selecting a childless node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafAction {
    None,
    ConstantCall(String),
    Transaction(String),
    EventList(String),
    EventWatch(String),
    Builtin(BuiltinCommand),
}

#[derive(Debug, Clone)]
pub struct MenuNode {
    pub segment: String,
    pub description: String,
    pub action: LeafAction,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    /// Build the menu for `interface`
    ///
    /// Root entries: `constant`, `events` (`list`, `watch`), `signer`
    /// (`key`, `show`) and `transact`. Every branch ends with `..`, `help`
    /// and `exit`.
    pub fn build(interface: &ContractInterface) -> Self {
        let mut tree = Self {
            nodes: vec![MenuNode {
                segment: String::new(),
                description: String::new(),
                action: LeafAction::None,
                parent: None,
                children: Vec::new(),
            }],
        };
        let root = tree.root();

        let constant = tree.add_branch(root, "constant", "call constant methods");
        let transact = tree.add_branch(root, "transact", "send transactions");
        for method in interface.methods() {
            let (parent, action) = if method.constant {
                (constant, LeafAction::ConstantCall(method.key.clone()))
            } else {
                (transact, LeafAction::Transaction(method.key.clone()))
            };
            tree.add(parent, &method.key, method.describe(), action);
        }

        let events = tree.add_branch(root, "events", "query contract events");
        let list = tree.add_branch(events, "list", "list past events");
        let watch = tree.add_branch(events, "watch", "watch new events");
        for event in interface.events() {
            tree.add(
                list,
                &event.key,
                event.describe(),
                LeafAction::EventList(event.key.clone()),
            );
            tree.add(
                watch,
                &event.key,
                event.describe(),
                LeafAction::EventWatch(event.key.clone()),
            );
        }

        let signer = tree.add_branch(root, "signer", "configure transaction signer");
        tree.add(
            signer,
            "key",
            "load signer key from file",
            LeafAction::Builtin(BuiltinCommand::SignerKey),
        );
        tree.add(
            signer,
            "show",
            "show signer address",
            LeafAction::Builtin(BuiltinCommand::SignerShow),
        );

        for branch in [root, constant, transact, events, list, watch, signer] {
            tree.seal(branch);
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MenuNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().copied()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Child of `id` whose segment is exactly `segment`
    pub fn child_named(&self, id: NodeId, segment: &str) -> Option<NodeId> {
        self.children(id)
            .find(|child| self.node(*child).segment == segment)
    }

    /// Breadcrumb path from the root; empty for the root itself
    pub fn name(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let node = self.node(node);
            if node.parent.is_some() {
                segments.push(node.segment.as_str());
            }
            cursor = node.parent;
        }
        segments.reverse();
        segments.join(SEPARATOR)
    }

    /// Children of `id` starting with `prefix`, in menu order
    pub fn completer(&self, id: NodeId, prefix: &str) -> Vec<Suggestion> {
        self.children(id)
            .map(|child| self.node(child))
            .filter(|node| node.segment.starts_with(prefix))
            .map(|node| Suggestion::new(node.segment.clone(), node.description.clone()))
            .collect()
    }

    /// One line per child: name padded to the longest name plus four
    pub fn help(&self, id: NodeId) -> Vec<String> {
        let width = self
            .children(id)
            .map(|child| self.node(child).segment.len())
            .max()
            .unwrap_or(0)
            + 4;
        self.children(id)
            .map(|child| {
                let node = self.node(child);
                format!("{:<width$}{}", node.segment, node.description)
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn add(
        &mut self,
        parent: NodeId,
        segment: &str,
        description: impl Into<String>,
        action: LeafAction,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MenuNode {
            segment: segment.to_string(),
            description: description.into(),
            action,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn add_branch(&mut self, parent: NodeId, segment: &str, description: &str) -> NodeId {
        self.add(parent, segment, description, LeafAction::None)
    }

    /// Sort content entries, then append the uniform trailing entries
    fn seal(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|a, b| self.nodes[a.0].segment.cmp(&self.nodes[b.0].segment));
        self.nodes[id.0].children = children;

        self.add(id, UP, "go to parent menu", LeafAction::Builtin(BuiltinCommand::Up));
        self.add(id, HELP, "show this help", LeafAction::Builtin(BuiltinCommand::Help));
        self.add(id, EXIT, "exit console", LeafAction::Builtin(BuiltinCommand::Exit));
    }
}
