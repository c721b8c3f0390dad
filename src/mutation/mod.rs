//! Generic create/update/delete machinery shared by every entity mutation
//!
//! A mutation call flows through [`engine::MutationEngine`]: authorize, locate
//! the target row, clean the input (resolving global ids), write it onto the
//! row, validate, then persist. Entity mutations only supply a
//! [`engine::ModelMutation`] describing their fields and hooks; see [`users`]
//! and [`posts`].

pub mod engine;
pub mod field_error;
pub mod input;
pub mod posts;
pub mod record;
pub mod users;

pub use engine::{MutationEngine, MutationResult, ModelMutation};
pub use field_error::{snake_to_camel_case, FieldError};
pub use input::{CleanedInput, CleanedValue, FieldKind, InputField, MutationArgs, RawInput};
pub use record::{FieldDefault, FieldSpec, Record, ValidationErrors};
