//! Type-directed conversion between operator text and contract values

use alloy_primitives::{keccak256, B256};
use alloy_dyn_abi::{DynSolValue, EventExt};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

use crate::core::{ConsoleError, ConsoleResult};
use crate::domain::abi::{ArgumentSpec, EventSpec, TypeDescriptor};
use crate::domain::contract::LogEntry;

/// Parse operator text into a value of type `ty`
pub fn encode(text: &str, ty: &TypeDescriptor) -> ConsoleResult<DynSolValue> {
    if !ty.is_string_like() && !ty.is_composite() {
        return encode_scalar(text.trim(), ty);
    }

    let literal = if ty.is_string_like() {
        format!("\"{text}\"")
    } else {
        text.to_string()
    };
    let json: JsonValue = serde_json::from_str(&literal)
        .map_err(|e| ConsoleError::InvalidArgument(format!("{ty}: {e}")))?;
    from_json(&json, ty)
}

/// Parse a scalar literal directly
fn encode_scalar(text: &str, ty: &TypeDescriptor) -> ConsoleResult<DynSolValue> {
    ty.to_dyn()
        .coerce_str(text)
        .map_err(|e| ConsoleError::InvalidArgument(format!("{ty}: {e}")))
}

/// Coerce a structured literal into the shape of `ty`
fn from_json(json: &JsonValue, ty: &TypeDescriptor) -> ConsoleResult<DynSolValue> {
    let mismatch = || ConsoleError::InvalidArgument(format!("expected {ty}, got {json}"));

    match ty {
        TypeDescriptor::String => match json {
            JsonValue::String(s) => Ok(DynSolValue::String(s.clone())),
            _ => Err(mismatch()),
        },
        TypeDescriptor::Bytes => match json {
            JsonValue::String(s) => {
                let payload = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(payload)
                    .map_err(|e| ConsoleError::InvalidArgument(format!("bytes: {e}")))?;
                Ok(DynSolValue::Bytes(bytes))
            }
            _ => Err(mismatch()),
        },
        TypeDescriptor::Bool => match json {
            JsonValue::Bool(b) => Ok(DynSolValue::Bool(*b)),
            _ => Err(mismatch()),
        },
        TypeDescriptor::Int(_)
        | TypeDescriptor::Uint(_)
        | TypeDescriptor::FixedBytes(_)
        | TypeDescriptor::Address
        | TypeDescriptor::Function => match json {
            JsonValue::String(s) => encode_scalar(s.trim(), ty),
            JsonValue::Number(n) => encode_scalar(&n.to_string(), ty),
            _ => Err(mismatch()),
        },
        TypeDescriptor::Array(inner) => match json {
            JsonValue::Array(items) => Ok(DynSolValue::Array(
                items
                    .iter()
                    .map(|item| from_json(item, inner))
                    .collect::<ConsoleResult<_>>()?,
            )),
            _ => Err(mismatch()),
        },
        TypeDescriptor::FixedArray(inner, size) => match json {
            JsonValue::Array(items) if items.len() == *size => Ok(DynSolValue::FixedArray(
                items
                    .iter()
                    .map(|item| from_json(item, inner))
                    .collect::<ConsoleResult<_>>()?,
            )),
            JsonValue::Array(items) => Err(ConsoleError::InvalidArgument(format!(
                "{ty}: expected {size} elements, got {}",
                items.len()
            ))),
            _ => Err(mismatch()),
        },
        TypeDescriptor::Tuple(fields) => match json {
            JsonValue::Array(items) if items.len() == fields.len() => Ok(DynSolValue::Tuple(
                fields
                    .iter()
                    .zip(items)
                    .map(|(field, item)| from_json(item, &field.ty))
                    .collect::<ConsoleResult<_>>()?,
            )),
            JsonValue::Object(map) => Ok(DynSolValue::Tuple(
                fields
                    .iter()
                    .map(|field| {
                        let item = map.get(&field.name).ok_or_else(|| {
                            ConsoleError::InvalidArgument(format!(
                                "{ty}: missing field '{}'",
                                field.name
                            ))
                        })?;
                        from_json(item, &field.ty)
                    })
                    .collect::<ConsoleResult<_>>()?,
            )),
            _ => Err(mismatch()),
        },
    }
}

/// Render a value for display
pub fn decode(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(addr) => addr.to_checksum(None),
        other => serde_json::to_string(&JsonView(other)).unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Serializes a value the way it is shown to the operator
struct JsonView<'a>(&'a DynSolValue);

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            DynSolValue::Bool(b) => serializer.serialize_bool(*b),
            // integers wider than 128 bits fall back to strings
            DynSolValue::Int(i, _) => match i.to_string().parse::<i128>() {
                Ok(small) => serializer.serialize_i128(small),
                Err(_) => serializer.serialize_str(&i.to_string()),
            },
            DynSolValue::Uint(u, _) => match u.to_string().parse::<u128>() {
                Ok(small) => serializer.serialize_u128(small),
                Err(_) => serializer.serialize_str(&u.to_string()),
            },
            DynSolValue::FixedBytes(word, size) => {
                let bytes = &word.as_slice()[..(*size).min(32)];
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
            DynSolValue::Address(addr) => serializer.serialize_str(&addr.to_checksum(None)),
            DynSolValue::Function(func) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(func.as_slice())))
            }
            DynSolValue::Bytes(bytes) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
            DynSolValue::String(s) => serializer.serialize_str(s),
            DynSolValue::Array(items)
            | DynSolValue::FixedArray(items)
            | DynSolValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&JsonView(item))?;
                }
                seq.end()
            }
            #[allow(unreachable_patterns)]
            other => serializer.serialize_str(&format!("{other:?}")),
        }
    }
}

/// Render `name=value` pairs separated by single spaces; unnamed values
/// are shown bare
pub fn format_named(pairs: &[(String, DynSolValue)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            if name.is_empty() {
                decode(value)
            } else {
                format!("{}={}", name, decode(value))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one decoded event entry
pub fn format_event(block_number: u64, pairs: &[(String, DynSolValue)]) -> String {
    format!("block {}: {}", block_number, format_named(pairs))
}

/// Outputs of a constant call, shaped by the number of declared outputs
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// Method declares no outputs
    None,
    Single(DynSolValue),
    List(Vec<DynSolValue>),
}

impl CallResult {
    /// Shape `values` after `outputs`; a count mismatch is an external failure
    pub fn collect(outputs: &[ArgumentSpec], values: Vec<DynSolValue>) -> ConsoleResult<Self> {
        if outputs.len() != values.len() {
            return Err(ConsoleError::external(anyhow::anyhow!(
                "expected {} outputs, got {}",
                outputs.len(),
                values.len()
            )));
        }
        let mut values = values;
        Ok(match outputs.len() {
            0 => CallResult::None,
            1 => CallResult::Single(values.remove(0)),
            _ => CallResult::List(values),
        })
    }

    /// Values in declared order
    pub fn slots(&self) -> Vec<&DynSolValue> {
        match self {
            CallResult::None => Vec::new(),
            CallResult::Single(value) => vec![value],
            CallResult::List(values) => values.iter().collect(),
        }
    }

    /// One display line per output slot
    pub fn render(&self, outputs: &[ArgumentSpec]) -> Vec<String> {
        self.slots()
            .into_iter()
            .zip(outputs)
            .map(|(value, spec)| {
                if spec.name.is_empty() {
                    decode(value)
                } else {
                    format!("{}={}", spec.name, decode(value))
                }
            })
            .collect()
    }
}

/// Decode a raw log into `(name, value)` pairs in declared argument order
pub fn decode_log(event: &EventSpec, entry: &LogEntry) -> anyhow::Result<Vec<(String, DynSolValue)>> {
    let decoded = event.event.decode_log(&entry.data)?;
    let mut indexed = decoded.indexed.into_iter();
    let mut body = decoded.body.into_iter();

    event
        .inputs
        .iter()
        .enumerate()
        .map(|(idx, arg)| {
            let value = if arg.indexed {
                indexed.next()
            } else {
                body.next()
            };
            let value =
                value.ok_or_else(|| anyhow::anyhow!("log is missing argument {}", arg.spec.name))?;
            Ok((arg.spec.display_name(idx), value))
        })
        .collect()
}

/// Topic used to filter on an indexed argument value
pub fn topic_for(value: &DynSolValue) -> B256 {
    match value.as_word() {
        Some(word) => word,
        None => keccak256(value.abi_encode_packed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Address, U256};
    use alloy_dyn_abi::JsonAbiExt;

    #[test]
    fn test_round_trip_uint() {
        let value = encode("42", &TypeDescriptor::Uint(256)).unwrap();
        assert_eq!(value, DynSolValue::Uint(U256::from(42), 256));
        assert_eq!(decode(&value), "42");
    }

    #[test]
    fn test_round_trip_bool() {
        let value = encode("true", &TypeDescriptor::Bool).unwrap();
        assert_eq!(decode(&value), "true");
    }

    #[test]
    fn test_encode_negative_int() {
        let value = encode("-5", &TypeDescriptor::Int(64)).unwrap();
        assert_eq!(decode(&value), "-5");
    }

    #[test]
    fn test_encode_string_is_wrapped() {
        let value = encode("hello world", &TypeDescriptor::String).unwrap();
        assert_eq!(value, DynSolValue::String("hello world".into()));
        assert_eq!(decode(&value), "\"hello world\"");
    }

    #[test]
    fn test_encode_string_with_quote_fails() {
        assert!(matches!(
            encode("say \"hi\"", &TypeDescriptor::String),
            Err(ConsoleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encode_bytes() {
        let value = encode("0xdeadbeef", &TypeDescriptor::Bytes).unwrap();
        assert_eq!(value, DynSolValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(decode(&value), "\"0xdeadbeef\"");
    }

    #[test]
    fn test_address_renders_checksummed() {
        let text = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        let value = encode(text, &TypeDescriptor::Address).unwrap();
        assert_eq!(decode(&value), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_invalid_scalar() {
        assert!(matches!(
            encode("not-a-number", &TypeDescriptor::Uint(256)),
            Err(ConsoleError::InvalidArgument(_))
        ));
        assert!(encode("0x1234", &TypeDescriptor::Address).is_err());
    }

    #[test]
    fn test_function_argument_encodes_into_calldata() {
        let interface = crate::infrastructure::abi::loader::parse_interface(
            r#"[{"type":"function","name":"register","stateMutability":"nonpayable",
                "inputs":[{"name":"cb","type":"function"}],"outputs":[]}]"#,
        )
        .unwrap();
        let method = interface.method("register").unwrap();
        assert_eq!(method.inputs[0].ty, TypeDescriptor::Function);

        let text = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed12345678";
        let value = encode(text, &method.inputs[0].ty).unwrap();
        assert!(matches!(value, DynSolValue::Function(_)));
        assert_eq!(decode(&value), format!("\"{text}\""));

        let calldata = method.function.abi_encode_input(&[value]).unwrap();
        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(hex::encode(&calldata[4..28]), &text[2..]);
    }

    #[test]
    fn test_encode_array() {
        let ty = TypeDescriptor::Array(Box::new(TypeDescriptor::Uint(256)));
        let value = encode("[1, 2, \"3\"]", &ty).unwrap();
        assert_eq!(decode(&value), "[1,2,3]");
    }

    #[test]
    fn test_fixed_array_length_mismatch() {
        let ty = TypeDescriptor::FixedArray(Box::new(TypeDescriptor::Bool), 2);
        assert!(encode("[true]", &ty).is_err());
        assert!(encode("[true, false]", &ty).is_ok());
    }

    #[test]
    fn test_encode_tuple_positional_and_named() {
        let ty = TypeDescriptor::parse("(address,uint256)").unwrap();
        let positional = encode(
            r#"["0x0000000000000000000000000000000000000001", 7]"#,
            &ty,
        )
        .unwrap();
        assert_eq!(
            decode(&positional),
            r#"["0x0000000000000000000000000000000000000001",7]"#
        );

        let named_ty = TypeDescriptor::Tuple(vec![
            crate::domain::abi::TupleField {
                name: "who".into(),
                ty: TypeDescriptor::Address,
            },
            crate::domain::abi::TupleField {
                name: "amount".into(),
                ty: TypeDescriptor::Uint(256),
            },
        ]);
        let named = encode(
            r#"{"amount": 7, "who": "0x0000000000000000000000000000000000000001"}"#,
            &named_ty,
        )
        .unwrap();
        assert_eq!(named, positional);
    }

    #[test]
    fn test_large_uint_renders_as_string() {
        let value = DynSolValue::Uint(U256::MAX, 256);
        assert_eq!(decode(&value), format!("\"{}\"", U256::MAX));
    }

    #[test]
    fn test_call_result_shapes() {
        let one = vec![ArgumentSpec::new("", TypeDescriptor::Bool)];
        let two = vec![
            ArgumentSpec::new("a", TypeDescriptor::Bool),
            ArgumentSpec::new("b", TypeDescriptor::Uint(8)),
        ];

        assert_eq!(CallResult::collect(&[], vec![]).unwrap(), CallResult::None);
        assert_eq!(
            CallResult::collect(&one, vec![DynSolValue::Bool(true)]).unwrap(),
            CallResult::Single(DynSolValue::Bool(true))
        );
        let list = CallResult::collect(
            &two,
            vec![DynSolValue::Bool(false), DynSolValue::Uint(U256::from(3), 8)],
        )
        .unwrap();
        assert_eq!(list.slots().len(), 2);
        assert_eq!(list.render(&two), vec!["a=false", "b=3"]);
        assert!(CallResult::collect(&one, vec![]).is_err());
    }

    #[test]
    fn test_format_event() {
        let from: Address = address!("0000000000000000000000000000000000000abc");
        let pairs = vec![
            ("from".to_string(), DynSolValue::Address(from)),
            ("value".to_string(), DynSolValue::Uint(U256::from(10), 256)),
        ];
        assert_eq!(
            format_event(12, &pairs),
            format!("block 12: from={} value=10", from.to_checksum(None))
        );
    }

    #[test]
    fn test_topic_for_word_and_dynamic() {
        let addr = DynSolValue::Address(Address::repeat_byte(0x11));
        let topic = topic_for(&addr);
        assert_eq!(&topic[12..], Address::repeat_byte(0x11).as_slice());

        let text = DynSolValue::String("abc".into());
        assert_eq!(topic_for(&text), keccak256("abc"));
    }
}
