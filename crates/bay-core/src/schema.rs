use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic type tag for action parameters and return payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Null,
}

impl ParamKind {
    /// Whether a JSON value inhabits this kind. Integers are accepted
    /// where a float is expected.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Float => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
            ParamKind::Null => value.is_null(),
        }
    }

    /// The kind name of a JSON value, for violation messages.
    pub fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
            Value::Number(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Float => "float",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
            ParamKind::Null => "null",
        };
        f.write_str(s)
    }
}

/// One declared parameter of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub required: bool,
    pub description: String,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
        }
    }
}

/// Shape of an action's success payload. The structured-error half of the
/// return contract is carried by [`crate::InvocationError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSpec {
    pub kind: ParamKind,
    pub description: String,
}

impl ReturnSpec {
    pub fn new(kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Return contract of an action that yields no payload.
    pub fn none() -> Self {
        Self {
            kind: ParamKind::Null,
            description: String::new(),
        }
    }
}

/// A single problem found while validating arguments against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MissingRequired {
        field: String,
    },
    TypeMismatch {
        field: String,
        expected: ParamKind,
        found: String,
    },
    UnknownField {
        field: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequired { field } => {
                write!(f, "missing required field: {field}")
            }
            Violation::TypeMismatch {
                field,
                expected,
                found,
            } => {
                write!(f, "type mismatch: {field}: expected {expected}, found {found}")
            }
            Violation::UnknownField { field } => write!(f, "unknown field: {field}"),
        }
    }
}

/// Schema of one invocable device action: argument names, types,
/// required-ness, and the return contract. Free-text descriptions are
/// written for consumption by an agent's planner. Immutable once declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSchema {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    returns: ReturnSpec,
}

impl ActionSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            returns: ReturnSpec::none(),
        }
    }

    /// Add a parameter. Declaration order is preserved and drives the
    /// order of reported violations.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn returns(mut self, returns: ReturnSpec) -> Self {
        self.returns = returns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn return_spec(&self) -> &ReturnSpec {
        &self.returns
    }

    /// Validate an arguments mapping against this schema.
    ///
    /// Pure function of (schema, arguments): no side effects, identical
    /// inputs always yield the identical violation list. An empty list
    /// means the arguments are acceptable.
    pub fn validate(&self, args: &Map<String, Value>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for param in &self.params {
            match args.get(&param.name) {
                None => {
                    if param.required {
                        violations.push(Violation::MissingRequired {
                            field: param.name.clone(),
                        });
                    }
                }
                Some(value) => {
                    // An explicit null is treated as absent for optional params.
                    if !param.required && value.is_null() {
                        continue;
                    }
                    if !param.kind.admits(value) {
                        violations.push(Violation::TypeMismatch {
                            field: param.name.clone(),
                            expected: param.kind,
                            found: ParamKind::name_of(value).to_string(),
                        });
                    }
                }
            }
        }

        for field in args.keys() {
            if !self.params.iter().any(|p| &p.name == field) {
                violations.push(Violation::UnknownField {
                    field: field.clone(),
                });
            }
        }

        violations
    }
}
