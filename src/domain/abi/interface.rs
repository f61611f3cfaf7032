//! Contract interface - methods and events keyed by menu name

use std::collections::{BTreeMap, HashSet};

use alloy_json_abi::{Event, Function, JsonAbi, StateMutability};
use anyhow::{Context, Result};

use super::types::{ArgumentSpec, TypeDescriptor};

/// A callable contract method
#[derive(Debug, Clone)]
pub struct MethodSpec {
    /// Unique menu key (overloads get an index suffix)
    pub key: String,
    pub inputs: Vec<ArgumentSpec>,
    pub outputs: Vec<ArgumentSpec>,
    /// `view` or `pure`
    pub constant: bool,
    pub payable: bool,
    /// Parsed ABI entry used for calldata coding
    pub function: Function,
}

impl MethodSpec {
    pub fn from_function(key: String, function: &Function) -> Result<Self> {
        let inputs = function
            .inputs
            .iter()
            .map(ArgumentSpec::from_param)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("inputs of '{}'", function.name))?;
        let outputs = function
            .outputs
            .iter()
            .map(ArgumentSpec::from_param)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("outputs of '{}'", function.name))?;
        Ok(Self {
            key,
            inputs,
            outputs,
            constant: matches!(
                function.state_mutability,
                StateMutability::View | StateMutability::Pure
            ),
            payable: function.state_mutability == StateMutability::Payable,
            function: function.clone(),
        })
    }

    /// Human readable signature, e.g. `transfer(address to, uint256 amount) returns (bool)`
    pub fn describe(&self) -> String {
        let mut out = format!("{}({})", self.function.name, join_args(&self.inputs));
        if self.payable {
            out.push_str(" payable");
        }
        if !self.outputs.is_empty() {
            out.push_str(&format!(" returns ({})", join_args(&self.outputs)));
        }
        out
    }
}

/// One event argument with its indexing flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventArgument {
    pub spec: ArgumentSpec,
    pub indexed: bool,
}

/// An event the contract can emit
#[derive(Debug, Clone)]
pub struct EventSpec {
    pub key: String,
    pub inputs: Vec<EventArgument>,
    pub anonymous: bool,
    /// Parsed ABI entry used for topic and log decoding
    pub event: Event,
}

impl EventSpec {
    pub fn from_event(key: String, event: &Event) -> Result<Self> {
        let inputs = event
            .inputs
            .iter()
            .map(|param| {
                let ty = TypeDescriptor::from_event_param(param)
                    .with_context(|| format!("parameter '{}'", param.name))?;
                Ok(EventArgument {
                    spec: ArgumentSpec::new(param.name.clone(), ty),
                    indexed: param.indexed,
                })
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("inputs of event '{}'", event.name))?;
        Ok(Self {
            key,
            inputs,
            anonymous: event.anonymous,
            event: event.clone(),
        })
    }

    /// Human readable signature with `indexed` markers
    pub fn describe(&self) -> String {
        let args = self
            .inputs
            .iter()
            .map(|arg| {
                if arg.indexed {
                    format!("{} indexed {}", arg.spec.ty, arg.spec.name)
                        .trim_end()
                        .to_string()
                } else {
                    arg.spec.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.event.name, args)
    }
}

/// Methods and events of one contract
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    methods: BTreeMap<String, MethodSpec>,
    events: BTreeMap<String, EventSpec>,
}

impl ContractInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed JSON ABI
    pub fn from_json_abi(abi: &JsonAbi) -> Result<Self> {
        let mut interface = Self::new();
        for (key, function) in overload_keys(&abi.functions) {
            interface.insert_method(MethodSpec::from_function(key, function)?);
        }
        for (key, event) in overload_keys(&abi.events) {
            interface.insert_event(EventSpec::from_event(key, event)?);
        }
        Ok(interface)
    }

    pub fn insert_method(&mut self, method: MethodSpec) {
        self.methods.insert(method.key.clone(), method);
    }

    pub fn insert_event(&mut self, event: EventSpec) {
        self.events.insert(event.key.clone(), event);
    }

    pub fn method(&self, key: &str) -> Option<&MethodSpec> {
        self.methods.get(key)
    }

    pub fn event(&self, key: &str) -> Option<&EventSpec> {
        self.events.get(key)
    }

    /// All methods, ordered by key
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.methods.values()
    }

    /// All events, ordered by key
    pub fn events(&self) -> impl Iterator<Item = &EventSpec> {
        self.events.values()
    }
}

/// First overload keeps its name, later ones get the lowest free numeric
/// suffix starting at their index. Every plain name is reserved up front
/// so a suffixed key never shadows a declared member.
fn overload_keys<T>(entries: &BTreeMap<String, Vec<T>>) -> Vec<(String, &T)> {
    let mut taken: HashSet<String> = entries.keys().cloned().collect();
    let mut keys = Vec::new();
    for (name, overloads) in entries {
        for (idx, item) in overloads.iter().enumerate() {
            if idx == 0 {
                keys.push((name.clone(), item));
                continue;
            }
            let mut suffix = idx;
            let mut key = format!("{name}{suffix}");
            while !taken.insert(key.clone()) {
                suffix += 1;
                key = format!("{name}{suffix}");
            }
            keys.push((key, item));
        }
    }
    keys
}

fn join_args(args: &[ArgumentSpec]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20_ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"deposit","stateMutability":"payable",
         "inputs":[],"outputs":[]},
        {"type":"function","name":"safeTransfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"}],"outputs":[]},
        {"type":"function","name":"safeTransfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"data","type":"bytes"}],"outputs":[]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    fn erc20() -> ContractInterface {
        let abi: JsonAbi = serde_json::from_str(ERC20_ABI).unwrap();
        ContractInterface::from_json_abi(&abi).unwrap()
    }

    #[test]
    fn test_mutability_flags() {
        let interface = erc20();
        assert!(interface.method("balanceOf").unwrap().constant);
        let transfer = interface.method("transfer").unwrap();
        assert!(!transfer.constant);
        assert!(!transfer.payable);
        assert!(interface.method("deposit").unwrap().payable);
    }

    #[test]
    fn test_overloads_get_unique_keys() {
        let interface = erc20();
        assert_eq!(interface.method("safeTransfer").unwrap().inputs.len(), 1);
        assert_eq!(interface.method("safeTransfer1").unwrap().inputs.len(), 2);
    }

    #[test]
    fn test_overload_suffix_skips_declared_names() {
        let abi: JsonAbi = serde_json::from_str(
            r#"[
            {"type":"function","name":"foo","stateMutability":"nonpayable","inputs":[],"outputs":[]},
            {"type":"function","name":"foo","stateMutability":"nonpayable",
             "inputs":[{"name":"x","type":"uint256"}],"outputs":[]},
            {"type":"function","name":"foo1","stateMutability":"view","inputs":[],"outputs":[]}
        ]"#,
        )
        .unwrap();
        let interface = ContractInterface::from_json_abi(&abi).unwrap();

        let keys: Vec<_> = interface.methods().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["foo", "foo1", "foo2"]);
        assert!(interface.method("foo1").unwrap().constant);
        assert_eq!(interface.method("foo2").unwrap().inputs.len(), 1);
    }

    #[test]
    fn test_event_indexed_args() {
        let interface = erc20();
        let transfer = interface.event("Transfer").unwrap();
        let indexed: Vec<_> = transfer
            .inputs
            .iter()
            .filter(|arg| arg.indexed)
            .map(|arg| arg.spec.name.as_str())
            .collect();
        assert_eq!(indexed, vec!["from", "to"]);
        assert_eq!(
            transfer.describe(),
            "Transfer(address indexed from, address indexed to, uint256 value)"
        );
    }

    #[test]
    fn test_describe_method() {
        let interface = erc20();
        assert_eq!(
            interface.method("transfer").unwrap().describe(),
            "transfer(address to, uint256 amount) returns (bool)"
        );
    }
}
