//! Type descriptors for contract arguments

use std::fmt;

use alloy_dyn_abi::DynSolType;
use alloy_json_abi::{EventParam, Param};
use anyhow::{bail, Context, Result};

/// Shape of a contract value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Int(usize),
    Uint(usize),
    Bool,
    String,
    Bytes,
    FixedBytes(usize),
    Address,
    /// External function pointer: address followed by selector
    Function,
    Array(Box<TypeDescriptor>),
    FixedArray(Box<TypeDescriptor>, usize),
    Tuple(Vec<TupleField>),
}

/// A named tuple component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl TypeDescriptor {
    /// Whether values of this type travel as quoted text
    pub fn is_string_like(&self) -> bool {
        matches!(self, TypeDescriptor::String | TypeDescriptor::Bytes)
    }

    /// Whether values of this type are arrays or tuples
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Array(_) | TypeDescriptor::FixedArray(..) | TypeDescriptor::Tuple(_)
        )
    }

    /// Convert to the alloy dynamic type used for ABI coding
    pub fn to_dyn(&self) -> DynSolType {
        match self {
            TypeDescriptor::Int(bits) => DynSolType::Int(*bits),
            TypeDescriptor::Uint(bits) => DynSolType::Uint(*bits),
            TypeDescriptor::Bool => DynSolType::Bool,
            TypeDescriptor::String => DynSolType::String,
            TypeDescriptor::Bytes => DynSolType::Bytes,
            TypeDescriptor::FixedBytes(size) => DynSolType::FixedBytes(*size),
            TypeDescriptor::Address => DynSolType::Address,
            TypeDescriptor::Function => DynSolType::Function,
            TypeDescriptor::Array(inner) => DynSolType::Array(Box::new(inner.to_dyn())),
            TypeDescriptor::FixedArray(inner, size) => {
                DynSolType::FixedArray(Box::new(inner.to_dyn()), *size)
            }
            TypeDescriptor::Tuple(fields) => {
                DynSolType::Tuple(fields.iter().map(|field| field.ty.to_dyn()).collect())
            }
        }
    }

    /// Build a descriptor from an alloy dynamic type; tuple fields stay unnamed
    pub fn from_dyn(ty: &DynSolType) -> Result<Self> {
        Ok(match ty {
            DynSolType::Int(bits) => TypeDescriptor::Int(*bits),
            DynSolType::Uint(bits) => TypeDescriptor::Uint(*bits),
            DynSolType::Bool => TypeDescriptor::Bool,
            DynSolType::String => TypeDescriptor::String,
            DynSolType::Bytes => TypeDescriptor::Bytes,
            DynSolType::FixedBytes(size) => TypeDescriptor::FixedBytes(*size),
            DynSolType::Address => TypeDescriptor::Address,
            DynSolType::Function => TypeDescriptor::Function,
            DynSolType::Array(inner) => TypeDescriptor::Array(Box::new(Self::from_dyn(inner)?)),
            DynSolType::FixedArray(inner, size) => {
                TypeDescriptor::FixedArray(Box::new(Self::from_dyn(inner)?), *size)
            }
            DynSolType::Tuple(types) => TypeDescriptor::Tuple(
                types
                    .iter()
                    .map(|ty| {
                        Ok(TupleField {
                            name: String::new(),
                            ty: Self::from_dyn(ty)?,
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            #[allow(unreachable_patterns)]
            other => bail!("unsupported type {other}"),
        })
    }

    /// Parse a Solidity type string such as `uint256` or `(address,bool)[]`
    pub fn parse(ty: &str) -> Result<Self> {
        let parsed = DynSolType::parse(ty).with_context(|| format!("invalid type '{ty}'"))?;
        Self::from_dyn(&parsed)
    }

    /// Build a descriptor from a JSON ABI parameter, keeping tuple field names
    pub fn from_param(ty: &str, components: &[Param]) -> Result<Self> {
        let Some(suffix) = ty.strip_prefix("tuple") else {
            return Self::parse(ty);
        };
        let fields = components
            .iter()
            .map(|component| {
                Ok(TupleField {
                    name: component.name.clone(),
                    ty: Self::from_param(&component.ty, &component.components)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        apply_array_suffix(TypeDescriptor::Tuple(fields), suffix)
    }

    pub fn from_event_param(param: &EventParam) -> Result<Self> {
        Self::from_param(&param.ty, &param.components)
    }
}

/// Wrap `base` in the array dimensions described by `suffix` (e.g. `[2][]`)
fn apply_array_suffix(mut base: TypeDescriptor, suffix: &str) -> Result<TypeDescriptor> {
    let mut rest = suffix;
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            bail!("invalid array suffix '{suffix}'");
        };
        let close = inner
            .find(']')
            .with_context(|| format!("invalid array suffix '{suffix}'"))?;
        let size = &inner[..close];
        base = if size.is_empty() {
            TypeDescriptor::Array(Box::new(base))
        } else {
            let size = size
                .parse::<usize>()
                .with_context(|| format!("invalid array size '{size}'"))?;
            TypeDescriptor::FixedArray(Box::new(base), size)
        };
        rest = &inner[close + 1..];
    }
    Ok(base)
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Int(bits) => write!(f, "int{bits}"),
            TypeDescriptor::Uint(bits) => write!(f, "uint{bits}"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::FixedBytes(size) => write!(f, "bytes{size}"),
            TypeDescriptor::Address => f.write_str("address"),
            TypeDescriptor::Function => f.write_str("function"),
            TypeDescriptor::Array(inner) => write!(f, "{inner}[]"),
            TypeDescriptor::FixedArray(inner, size) => write!(f, "{inner}[{size}]"),
            TypeDescriptor::Tuple(fields) => {
                f.write_str("(")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A named, typed argument of a method or event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Parameter name (may be empty)
    pub name: String,
    pub ty: TypeDescriptor,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn from_param(param: &Param) -> Result<Self> {
        let ty = TypeDescriptor::from_param(&param.ty, &param.components)
            .with_context(|| format!("parameter '{}'", param.name))?;
        Ok(Self::new(param.name.clone(), ty))
    }

    /// Name used in prompts and output; falls back to `argN`
    pub fn display_name(&self, idx: usize) -> String {
        if self.name.trim().is_empty() {
            format!("arg{idx}")
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.ty, self.name)
        }
    }
}
