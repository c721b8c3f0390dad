//! User mutations: registration, flag updates and deletion

use sea_orm::ActiveValue;
use serde_json::Value;

use super::engine::ModelMutation;
use super::input::{CleanedInput, CleanedValue, InputField, MutationArgs};
use super::record::Record;
use crate::auth::Principal;
use crate::database::entities::users;
use crate::errors::CoreResult;
use crate::services::user_service::{hash_password, normalize_email};

pub type UserRecord = users::ActiveModel;

const REGISTER_INPUT: &[InputField] = &[
    InputField::scalar("email"),
    InputField::scalar("username"),
    InputField::scalar("password"),
    InputField::scalar("is_active"),
];

const UPDATE_INPUT: &[InputField] = &[
    InputField::scalar("is_staff"),
    InputField::scalar("is_admin"),
    InputField::scalar("is_active"),
];

pub fn register_user() -> ModelMutation<UserRecord> {
    ModelMutation::new("registerUser")
        .input(REGISTER_INPUT)
        .clean_input_with(normalize_email_input)
        .on_save(hash_new_password)
}

pub fn update_user() -> ModelMutation<UserRecord> {
    ModelMutation::new("updateUser")
        .input(UPDATE_INPUT)
        .allow(is_authenticated)
        .clean_input_with(drop_unpermitted_flags)
}

pub fn delete_user() -> ModelMutation<UserRecord> {
    ModelMutation::new("deleteUser")
        .allow(is_authenticated)
        .allow_target(is_self_or_privileged)
}

fn is_authenticated(principal: &Principal, _args: &MutationArgs) -> bool {
    principal.is_authenticated
}

fn is_self_or_privileged(principal: &Principal, target: &users::Model) -> bool {
    principal.is(target.id) || principal.is_privileged()
}

fn normalize_email_input(_principal: &Principal, _user: &UserRecord, cleaned: &mut CleanedInput) {
    if let Some(CleanedValue::Value(Value::String(email))) = cleaned.get("email") {
        let normalized = normalize_email(email);
        cleaned.insert("email", CleanedValue::Value(Value::String(normalized)));
    }
}

/// Each flag needs its own privilege; anything else is dropped without an error
fn drop_unpermitted_flags(principal: &Principal, user: &UserRecord, cleaned: &mut CleanedInput) {
    let is_self = user.pk().map_or(false, |pk| principal.is(pk));

    if !(is_self || principal.is_staff || principal.is_admin) {
        cleaned.remove("is_active");
    }
    if !principal.is_admin {
        cleaned.remove("is_admin");
    }
    if !principal.is_staff {
        cleaned.remove("is_staff");
    }

    let nulls: Vec<String> = cleaned
        .fields()
        .filter(|field| cleaned.get(field).map_or(false, CleanedValue::is_null))
        .map(str::to_string)
        .collect();
    for field in nulls {
        cleaned.remove(&field);
    }
}

fn hash_new_password(user: &mut UserRecord, _cleaned: &CleanedInput) -> CoreResult<()> {
    if let ActiveValue::Set(password) = &user.password {
        let hashed = hash_password(password)?;
        user.password = ActiveValue::Set(hashed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flags() -> CleanedInput {
        let mut cleaned = CleanedInput::new();
        cleaned.insert("is_staff", CleanedValue::Value(json!(true)));
        cleaned.insert("is_admin", CleanedValue::Value(json!(true)));
        cleaned.insert("is_active", CleanedValue::Value(json!(false)));
        cleaned
    }

    fn existing_user(id: i32) -> UserRecord {
        let mut user = UserRecord::blank();
        user.id = ActiveValue::Unchanged(id);
        user
    }

    #[test]
    fn plain_users_only_touch_their_own_active_flag() {
        let mut cleaned = flags();
        drop_unpermitted_flags(&Principal::user(3), &existing_user(3), &mut cleaned);
        assert_eq!(cleaned.fields().collect::<Vec<_>>(), vec!["is_active"]);

        let mut cleaned = flags();
        drop_unpermitted_flags(&Principal::user(3), &existing_user(4), &mut cleaned);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn staff_and_admin_flags_need_matching_roles() {
        let mut cleaned = flags();
        drop_unpermitted_flags(&Principal::user(1).with_staff(), &existing_user(4), &mut cleaned);
        assert_eq!(cleaned.fields().collect::<Vec<_>>(), vec!["is_staff", "is_active"]);

        let mut cleaned = flags();
        drop_unpermitted_flags(&Principal::user(1).with_admin(), &existing_user(4), &mut cleaned);
        assert_eq!(cleaned.fields().collect::<Vec<_>>(), vec!["is_admin", "is_active"]);
    }

    #[test]
    fn null_flags_are_ignored() {
        let mut cleaned = CleanedInput::new();
        cleaned.insert("is_active", CleanedValue::null());
        drop_unpermitted_flags(&Principal::user(1).with_admin(), &existing_user(1), &mut cleaned);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn registration_normalizes_email() {
        let mut cleaned = CleanedInput::new();
        cleaned.insert("email", CleanedValue::Value(json!("Ann@Example.COM")));
        normalize_email_input(&Principal::anonymous(), &UserRecord::blank(), &mut cleaned);
        assert_eq!(
            cleaned.get("email"),
            Some(&CleanedValue::Value(json!("Ann@example.com")))
        );
    }

    #[test]
    fn deletion_needs_ownership_or_role() {
        let target = users::Model {
            id: 7,
            password: String::new(),
            last_login: None,
            email: "t@example.com".to_string(),
            username: "t".to_string(),
            is_active: true,
            is_staff: false,
            is_admin: false,
        };
        assert!(is_self_or_privileged(&Principal::user(7), &target));
        assert!(is_self_or_privileged(&Principal::user(1).with_staff(), &target));
        assert!(!is_self_or_privileged(&Principal::user(1), &target));
    }
}
