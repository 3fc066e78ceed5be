//! Typed parameter bags for topology families.

use std::collections::BTreeMap;
use std::fmt;

use serde_yaml::Value;

use crate::error::{Result, TopologyError};
use crate::topology::types::NodeId;

/// Value type a family parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Str,
    IdList,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Str => "string",
            ParamKind::IdList => "list of node ids",
        })
    }
}

/// Default applied when a parameter is omitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Required,
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl fmt::Display for ParamDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDefault::Required => f.write_str("required"),
            ParamDefault::Int(v) => write!(f, "{}", v),
            ParamDefault::Float(v) => write!(f, "{}", v),
            ParamDefault::Str(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Declaration of one family parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ParamKind,
    pub default: ParamDefault,
    pub help: &'static str,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ParamKind, default: ParamDefault) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            default,
            help: "",
        }
    }

    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Ids(Vec<NodeId>),
}

/// Parameters resolved against a family's declarations
#[derive(Debug, Clone, Default)]
pub struct Params {
    family: String,
    values: BTreeMap<&'static str, ParamValue>,
}

fn convert(family: &str, spec: &ParamSpec, value: &Value) -> Result<ParamValue> {
    let mismatch = || {
        TopologyError::config(format!(
            "{}: parameter '{}' expects {}, got {:?}",
            family, spec.name, spec.kind, value
        ))
    };
    match spec.kind {
        ParamKind::Int => value.as_i64().map(ParamValue::Int).ok_or_else(mismatch),
        ParamKind::Float => value.as_f64().map(ParamValue::Float).ok_or_else(mismatch),
        ParamKind::Str => match value {
            Value::String(s) => Ok(ParamValue::Str(s.clone())),
            Value::Number(n) => Ok(ParamValue::Str(n.to_string())),
            _ => Err(mismatch()),
        },
        ParamKind::IdList => {
            let items = value.as_sequence().ok_or_else(mismatch)?;
            items
                .iter()
                .map(|item| {
                    serde_yaml::from_value::<NodeId>(item.clone()).map_err(|_| mismatch())
                })
                .collect::<Result<Vec<_>>>()
                .map(ParamValue::Ids)
        }
    }
}

impl Params {
    /// Match raw key/value pairs to `specs`, filling defaults
    ///
    /// Unknown keys, missing required parameters and wrongly typed values are
    /// configuration errors.
    pub fn resolve(
        family: &str,
        specs: &'static [ParamSpec],
        raw: &BTreeMap<String, Value>,
    ) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let spec = specs.iter().find(|s| s.matches(key)).ok_or_else(|| {
                let known: Vec<&str> = specs.iter().map(|s| s.name).collect();
                TopologyError::config(format!(
                    "{}: unknown parameter '{}' (accepted: {})",
                    family,
                    key,
                    if known.is_empty() { "none".to_string() } else { known.join(", ") }
                ))
            })?;
            if values.contains_key(spec.name) {
                return Err(TopologyError::config(format!(
                    "{}: parameter '{}' given more than once",
                    family, spec.name
                )));
            }
            values.insert(spec.name, convert(family, spec, value)?);
        }

        for spec in specs {
            if values.contains_key(spec.name) {
                continue;
            }
            let value = match spec.default {
                ParamDefault::Required => {
                    return Err(TopologyError::config(format!(
                        "{}: missing required parameter '{}'",
                        family, spec.name
                    )))
                }
                ParamDefault::Int(v) => ParamValue::Int(v),
                ParamDefault::Float(v) => ParamValue::Float(v),
                ParamDefault::Str(v) => ParamValue::Str(v.to_string()),
            };
            values.insert(spec.name, value);
        }

        Ok(Self {
            family: family.to_string(),
            values,
        })
    }

    /// True when every declared parameter has a default
    pub fn all_defaulted(specs: &[ParamSpec]) -> bool {
        specs.iter().all(|s| s.default != ParamDefault::Required)
    }

    fn get(&self, name: &str) -> Result<&ParamValue> {
        self.values.get(name).ok_or_else(|| {
            TopologyError::config(format!("{}: parameter '{}' is not declared", self.family, name))
        })
    }

    fn wrong_type(&self, name: &str, kind: ParamKind) -> TopologyError {
        TopologyError::config(format!("{}: parameter '{}' is not {}", self.family, name, kind))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name)? {
            ParamValue::Int(v) => Ok(*v),
            _ => Err(self.wrong_type(name, ParamKind::Int)),
        }
    }

    /// Integer parameter that must be at least `min`
    pub fn count(&self, name: &str, min: usize) -> Result<usize> {
        let v = self.int(name)?;
        match usize::try_from(v) {
            Ok(n) if n >= min => Ok(n),
            _ => Err(TopologyError::config(format!(
                "{}: '{}' must be at least {}, got {}",
                self.family, name, min, v
            ))),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f64),
            _ => Err(self.wrong_type(name, ParamKind::Float)),
        }
    }

    /// Delay parameter in milliseconds, non-negative
    pub fn delay(&self, name: &str) -> Result<f64> {
        let v = self.float(name)?;
        if v.is_finite() && v >= 0.0 {
            Ok(v)
        } else {
            Err(TopologyError::config(format!(
                "{}: delay '{}' must be non-negative, got {}",
                self.family, name, v
            )))
        }
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        match self.get(name)? {
            ParamValue::Str(v) => Ok(v),
            _ => Err(self.wrong_type(name, ParamKind::Str)),
        }
    }

    pub fn ids(&self, name: &str) -> Result<&[NodeId]> {
        match self.get(name)? {
            ParamValue::Ids(v) => Ok(v),
            _ => Err(self.wrong_type(name, ParamKind::IdList)),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}
