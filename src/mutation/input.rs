use async_graphql::MaybeUndefined;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::node::{EntityKind, Node};

/// How the engine treats a declared input field while cleaning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Passed through unchanged
    Scalar,
    /// A global id resolved into a single node
    Id(Option<EntityKind>),
    /// A list of global ids resolved with one batched query
    IdList(Option<EntityKind>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl InputField {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn id(name: &'static str, kind: Option<EntityKind>) -> Self {
        Self {
            name,
            kind: FieldKind::Id(kind),
        }
    }

    pub const fn id_list(name: &'static str, kind: Option<EntityKind>) -> Self {
        Self {
            name,
            kind: FieldKind::IdList(kind),
        }
    }
}

/// Input exactly as received, keyed by snake_case field name.
///
/// Absent fields are missing from the map; explicit nulls are `Value::Null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawInput(IndexMap<String, Value>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Record a GraphQL input value, keeping undefined fields out of the map
    pub fn insert_maybe<T: Into<Value>>(&mut self, field: &str, value: MaybeUndefined<T>) {
        match value {
            MaybeUndefined::Undefined => {}
            MaybeUndefined::Null => self.insert(field, Value::Null),
            MaybeUndefined::Value(value) => self.insert(field, value),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Arguments of one mutation call, as seen by authorization predicates
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationArgs {
    pub id: Option<String>,
    pub input: RawInput,
}

impl MutationArgs {
    pub fn create(input: RawInput) -> Self {
        Self { id: None, input }
    }

    pub fn update(id: impl Into<String>, input: RawInput) -> Self {
        Self {
            id: Some(id.into()),
            input,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            input: RawInput::new(),
        }
    }
}

/// An input value after id fields were resolved
#[derive(Clone, Debug, PartialEq)]
pub enum CleanedValue {
    Value(Value),
    Node(Node),
    Nodes(Vec<Node>),
}

impl CleanedValue {
    pub fn null() -> Self {
        CleanedValue::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CleanedValue::Value(Value::Null))
    }

    pub fn into_string(self) -> Result<String, String> {
        match self {
            CleanedValue::Value(Value::String(value)) => Ok(value),
            CleanedValue::Value(Value::Number(value)) => Ok(value.to_string()),
            other => Err(format!("'{}' value must be a string.", other.describe())),
        }
    }

    pub fn into_bool(self) -> Result<bool, String> {
        match self {
            CleanedValue::Value(Value::Bool(value)) => Ok(value),
            other => Err(format!(
                "'{}' value must be either True or False.",
                other.describe()
            )),
        }
    }

    pub fn into_i64(self) -> Result<i64, String> {
        match self {
            CleanedValue::Value(Value::Number(value)) => value
                .as_i64()
                .ok_or_else(|| format!("'{}' value must be an integer.", value)),
            other => Err(format!("'{}' value must be an integer.", other.describe())),
        }
    }

    pub fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        match self {
            CleanedValue::Value(Value::String(value)) => DateTime::parse_from_rfc3339(&value)
                .map(|value| value.with_timezone(&Utc))
                .map_err(|_| {
                    format!(
                        "'{}' value has an invalid format. It must be in RFC 3339 format.",
                        value
                    )
                }),
            other => Err(format!(
                "'{}' value has an invalid format. It must be in RFC 3339 format.",
                other.describe()
            )),
        }
    }

    pub fn into_node(self) -> Result<Node, String> {
        match self {
            CleanedValue::Node(node) => Ok(node),
            other => Err(format!("'{}' is not a resolved node.", other.describe())),
        }
    }

    fn describe(&self) -> String {
        match self {
            CleanedValue::Value(Value::String(value)) => value.clone(),
            CleanedValue::Value(value) => value.to_string(),
            CleanedValue::Node(node) => format!("{:?}:{}", node.kind(), node.pk()),
            CleanedValue::Nodes(nodes) => format!("{} nodes", nodes.len()),
        }
    }
}

/// Input after cleaning; built per invocation, never persisted
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleanedInput(IndexMap<String, CleanedValue>);

impl CleanedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: CleanedValue) {
        self.0.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&CleanedValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<CleanedValue> {
        self.0.shift_remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
