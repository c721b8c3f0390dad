use async_trait::async_trait;
use indexmap::IndexMap;
use sea_orm::{ActiveValue, DatabaseConnection, DbErr};
use serde_json::Value;

use super::input::{CleanedInput, CleanedValue};
use crate::node::{EntityKind, Node};

/// Field-level validation messages in field declaration order
pub type ValidationErrors = IndexMap<String, Vec<String>>;

pub fn add_error(errors: &mut ValidationErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

/// Value a non-nullable field falls back to when it receives `null`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldDefault {
    Null,
    EmptyString,
    Str(&'static str),
    Bool(bool),
    Int(i64),
}

impl FieldDefault {
    pub fn value(&self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::EmptyString => Value::String(String::new()),
            FieldDefault::Str(value) => Value::String((*value).to_string()),
            FieldDefault::Bool(value) => Value::Bool(*value),
            FieldDefault::Int(value) => Value::from(*value),
        }
    }
}

/// Column metadata used when writing cleaned input onto a row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub editable: bool,
    pub auto: bool,
    pub nullable: bool,
    pub file: bool,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            editable: true,
            auto: false,
            nullable: false,
            file: false,
            default: FieldDefault::Null,
        }
    }

    /// Auto-generated primary key
    pub const fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn file(mut self) -> Self {
        self.file = true;
        self
    }

    pub const fn default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    /// What a `null` input becomes for this field
    pub fn null_replacement(&self) -> CleanedValue {
        // A non-nullable field takes its default even when it holds a file
        if !self.nullable {
            return CleanedValue::Value(self.default.value());
        }
        if self.file {
            return CleanedValue::Value(Value::Bool(false));
        }
        CleanedValue::null()
    }
}

/// An editable row the mutation engine can construct, validate and persist.
///
/// Implemented for the sea-orm active models; `Model` is the stored row.
#[async_trait]
pub trait Record: Sized + Send + Sync + 'static {
    type Model: Clone + Send + Sync + 'static;

    const KIND: EntityKind;

    fn fields() -> &'static [FieldSpec];

    /// A new unsaved row with every field at its default
    fn blank() -> Self;

    fn from_model(model: Self::Model) -> Self;

    fn model_from_node(node: Node) -> Option<Self::Model>;

    fn model_pk(model: &Self::Model) -> i32;

    fn set_model_pk(model: &mut Self::Model, pk: i32);

    /// `None` until the row has been inserted
    fn pk(&self) -> Option<i32>;

    fn write_field(&mut self, field: &str, value: CleanedValue) -> Result<(), String>;

    async fn full_clean(&self, db: &DatabaseConnection) -> Result<ValidationErrors, DbErr>;

    async fn persist(self, db: &DatabaseConnection) -> Result<Self::Model, DbErr>;

    /// Store fields that live outside the row itself
    async fn save_related(
        _model: &Self::Model,
        _cleaned: &CleanedInput,
        _db: &DatabaseConnection,
    ) -> Result<(), DbErr> {
        Ok(())
    }

    async fn delete_model(model: &Self::Model, db: &DatabaseConnection) -> Result<(), DbErr>;

    /// Field error for a constraint the store rejected after `full_clean` passed
    fn constraint_error(_err: &DbErr) -> Option<(&'static str, &'static str)> {
        None
    }
}

/// The value currently held by an active model column, if any
pub fn current<V>(value: &ActiveValue<V>) -> Option<&V>
where
    V: Into<sea_orm::Value>,
{
    match value {
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => Some(value),
        ActiveValue::NotSet => None,
    }
}

/// Shared checks for a required text column
pub fn check_required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &ActiveValue<String>,
    max_length: Option<usize>,
) {
    match current(value) {
        None => add_error(errors, field, "This field cannot be null."),
        Some(text) if text.trim().is_empty() => {
            add_error(errors, field, "This field cannot be blank.")
        }
        Some(text) => {
            let length = text.chars().count();
            if let Some(max) = max_length.filter(|max| length > *max) {
                add_error(
                    errors,
                    field,
                    format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        max, length
                    ),
                );
            }
        }
    }
}
