use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::field_error::FieldError;
use super::input::{CleanedInput, CleanedValue, FieldKind, InputField, MutationArgs, RawInput};
use super::record::{add_error, Record, ValidationErrors};
use crate::auth::Principal;
use crate::errors::{CoreError, CoreResult};
use crate::node::{NodeResolver, ResolveError, TypeRegistry};

/// Terminal output of every mutation; `errors` is empty exactly when it succeeded
#[derive(Clone, Debug, PartialEq)]
pub struct MutationResult<M> {
    pub instance: Option<M>,
    pub errors: Vec<FieldError>,
}

impl<M> MutationResult<M> {
    pub fn success(instance: M) -> Self {
        Self {
            instance: Some(instance),
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<FieldError>) -> Self {
        Self {
            instance: None,
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

fn allow_all(_principal: &Principal, _args: &MutationArgs) -> bool {
    true
}

fn allow_any_target<M>(_principal: &Principal, _target: &M) -> bool {
    true
}

fn keep_input<R>(_principal: &Principal, _instance: &R, _cleaned: &mut CleanedInput) {}

fn plain_save<R>(_instance: &mut R, _cleaned: &CleanedInput) -> CoreResult<()> {
    Ok(())
}

fn no_delete_errors<M>(_target: &M) -> Vec<FieldError> {
    Vec::new()
}

/// Capability record describing one entity mutation.
///
/// Every hook has a permissive default; entity mutations override only what
/// they need.
pub struct ModelMutation<R: Record> {
    pub name: &'static str,
    pub input_fields: &'static [InputField],
    /// Fields whose validation errors are hidden from clients (they still block the save)
    pub exclude: &'static [&'static str],
    pub user_is_allowed: fn(&Principal, &MutationArgs) -> bool,
    pub target_is_allowed: fn(&Principal, &R::Model) -> bool,
    pub clean_input: fn(&Principal, &R, &mut CleanedInput),
    pub save: fn(&mut R, &CleanedInput) -> CoreResult<()>,
    pub clean_delete: fn(&R::Model) -> Vec<FieldError>,
}

impl<R: Record> ModelMutation<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            input_fields: &[],
            exclude: &[],
            user_is_allowed: allow_all,
            target_is_allowed: allow_any_target::<R::Model>,
            clean_input: keep_input::<R>,
            save: plain_save::<R>,
            clean_delete: no_delete_errors::<R::Model>,
        }
    }

    pub fn input(mut self, fields: &'static [InputField]) -> Self {
        self.input_fields = fields;
        self
    }

    pub fn exclude(mut self, fields: &'static [&'static str]) -> Self {
        self.exclude = fields;
        self
    }

    pub fn allow(mut self, predicate: fn(&Principal, &MutationArgs) -> bool) -> Self {
        self.user_is_allowed = predicate;
        self
    }

    pub fn allow_target(mut self, predicate: fn(&Principal, &R::Model) -> bool) -> Self {
        self.target_is_allowed = predicate;
        self
    }

    pub fn clean_input_with(mut self, hook: fn(&Principal, &R, &mut CleanedInput)) -> Self {
        self.clean_input = hook;
        self
    }

    pub fn on_save(mut self, hook: fn(&mut R, &CleanedInput) -> CoreResult<()>) -> Self {
        self.save = hook;
        self
    }

    pub fn before_delete(mut self, hook: fn(&R::Model) -> Vec<FieldError>) -> Self {
        self.clean_delete = hook;
        self
    }
}

/// Runs create, update and delete mutations for any [`Record`]
#[derive(Clone)]
pub struct MutationEngine {
    db: DatabaseConnection,
    resolver: NodeResolver,
}

impl MutationEngine {
    pub fn new(db: DatabaseConnection, registry: Arc<TypeRegistry>) -> Self {
        let resolver = NodeResolver::new(db.clone(), registry);
        Self { db, resolver }
    }

    pub fn resolver(&self) -> &NodeResolver {
        &self.resolver
    }

    /// Create (no id) or update (id given) one row
    pub async fn mutate<R: Record>(
        &self,
        mutation: &ModelMutation<R>,
        principal: &Principal,
        args: MutationArgs,
    ) -> CoreResult<MutationResult<R::Model>> {
        if !(mutation.user_is_allowed)(principal, &args) {
            warn!("{} denied for principal {:?}", mutation.name, principal.id);
            return Err(CoreError::permission_denied());
        }

        let mut instance = match args.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                let target = match self.locate::<R>(id).await? {
                    Ok(target) => target,
                    Err(error) => return Ok(MutationResult::failure(vec![error])),
                };
                if !(mutation.target_is_allowed)(principal, &target) {
                    warn!("{} denied on {} for principal {:?}", mutation.name, id, principal.id);
                    return Err(CoreError::permission_denied());
                }
                R::from_model(target)
            }
            None => R::blank(),
        };

        let (mut cleaned, mut errors) = self.clean_input(mutation, &args.input).await?;
        (mutation.clean_input)(principal, &instance, &mut cleaned);

        let write_errors = construct_instance(&mut instance, &cleaned);
        let validation_errors = instance
            .full_clean(&self.db)
            .await
            .map_err(|e| CoreError::database("full_clean", e))?;
        errors.extend(clean_instance_errors(write_errors, mutation.exclude));
        errors.extend(clean_instance_errors(validation_errors, mutation.exclude));

        if !errors.is_empty() {
            info!("{} rejected with {} field error(s)", mutation.name, errors.len());
            return Ok(MutationResult::failure(errors));
        }

        (mutation.save)(&mut instance, &cleaned)?;
        let saved = match instance.persist(&self.db).await {
            Ok(saved) => saved,
            Err(e) => match R::constraint_error(&e) {
                Some((field, message)) => {
                    info!("{} rejected by the store: {}", mutation.name, e);
                    return Ok(MutationResult::failure(vec![FieldError::for_field(
                        field, message,
                    )]));
                }
                None => return Err(CoreError::database(mutation.name, e)),
            },
        };
        R::save_related(&saved, &cleaned, &self.db)
            .await
            .map_err(|e| CoreError::database(mutation.name, e))?;

        info!("{} saved {:?} {}", mutation.name, R::KIND, R::model_pk(&saved));
        Ok(MutationResult::success(saved))
    }

    /// Delete the row addressed by `args.id`
    pub async fn delete<R: Record>(
        &self,
        mutation: &ModelMutation<R>,
        principal: &Principal,
        args: MutationArgs,
    ) -> CoreResult<MutationResult<R::Model>> {
        if !(mutation.user_is_allowed)(principal, &args) {
            warn!("{} denied for principal {:?}", mutation.name, principal.id);
            return Err(CoreError::permission_denied());
        }

        let id = args.id.unwrap_or_default();
        let target = match self.locate::<R>(&id).await? {
            Ok(target) => target,
            Err(error) => return Ok(MutationResult::failure(vec![error])),
        };
        if !(mutation.target_is_allowed)(principal, &target) {
            warn!("{} denied on {} for principal {:?}", mutation.name, id, principal.id);
            return Err(CoreError::permission_denied());
        }

        let errors = (mutation.clean_delete)(&target);
        if !errors.is_empty() {
            return Ok(MutationResult::failure(errors));
        }

        let db_id = R::model_pk(&target);
        R::delete_model(&target, &self.db)
            .await
            .map_err(|e| CoreError::database(mutation.name, e))?;

        // The response still reports which row was removed
        let mut deleted = target;
        R::set_model_pk(&mut deleted, db_id);

        info!("{} deleted {:?} {}", mutation.name, R::KIND, db_id);
        Ok(MutationResult::success(deleted))
    }

    async fn locate<R: Record>(&self, id: &str) -> CoreResult<Result<R::Model, FieldError>> {
        match self.resolver.resolve(id, Some(R::KIND)).await {
            Ok(node) => Ok(R::model_from_node(node).ok_or_else(|| {
                FieldError::for_field("id", format!("Couldn't resolve to a node: {}", id))
            })),
            Err(ResolveError::Unresolved(message)) => Ok(Err(FieldError::for_field("id", message))),
            Err(ResolveError::Database(e)) => Err(CoreError::database("resolve node", e)),
        }
    }

    async fn clean_input<R: Record>(
        &self,
        mutation: &ModelMutation<R>,
        input: &RawInput,
    ) -> CoreResult<(CleanedInput, Vec<FieldError>)> {
        let mut cleaned = CleanedInput::new();
        let mut errors = Vec::new();

        for field in mutation.input_fields {
            let Some(value) = input.get(field.name) else {
                continue;
            };

            let outcome = match field.kind {
                FieldKind::IdList(kind) if !value.is_null() => {
                    let ids = id_list(value);
                    match ids {
                        Some(ids) if ids.is_empty() => Ok(CleanedValue::Nodes(Vec::new())),
                        Some(ids) => self
                            .resolver
                            .resolve_many(&ids, kind)
                            .await
                            .map(CleanedValue::Nodes),
                        None => Err(ResolveError::Unresolved(
                            "Enter a list of valid IDs.".to_string(),
                        )),
                    }
                }
                FieldKind::Id(kind) if !value.is_null() => match value.as_str() {
                    Some("") => Ok(CleanedValue::null()),
                    Some(id) => self.resolver.resolve(id, kind).await.map(CleanedValue::Node),
                    None => Err(ResolveError::Unresolved(format!(
                        "Couldn't resolve to a node: {}",
                        value
                    ))),
                },
                _ => Ok(CleanedValue::Value(value.clone())),
            };

            match outcome {
                Ok(value) => cleaned.insert(field.name, value),
                Err(ResolveError::Unresolved(message)) => {
                    debug!("{}: {} did not resolve: {}", mutation.name, field.name, message);
                    errors.push(FieldError::for_field(field.name, message));
                }
                Err(ResolveError::Database(e)) => {
                    return Err(CoreError::database("resolve input ids", e))
                }
            }
        }

        Ok((cleaned, errors))
    }
}

fn id_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|id| id.as_str().map(str::to_string))
        .collect()
}

/// Write every editable, non-auto field present in `cleaned` onto `instance`
pub fn construct_instance<R: Record>(instance: &mut R, cleaned: &CleanedInput) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for spec in R::fields() {
        if !spec.editable || spec.auto {
            continue;
        }
        let Some(value) = cleaned.get(spec.name) else {
            continue;
        };
        let value = if value.is_null() {
            spec.null_replacement()
        } else {
            value.clone()
        };
        if let Err(message) = instance.write_field(spec.name, value) {
            add_error(&mut errors, spec.name, message);
        }
    }

    errors
}

/// Turn validation messages into client-facing field errors, dropping excluded fields
pub fn clean_instance_errors(errors: ValidationErrors, exclude: &[&str]) -> Vec<FieldError> {
    errors
        .into_iter()
        .filter(|(field, _)| !exclude.contains(&field.as_str()))
        .flat_map(|(field, messages)| {
            messages
                .into_iter()
                .map(move |message| FieldError::for_field(&field, message))
        })
        .collect()
}
