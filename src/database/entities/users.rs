use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set, SqlErr};
use serde::{Deserialize, Serialize};

use crate::mutation::input::CleanedValue;
use crate::mutation::record::{
    add_error, check_required_text, current, FieldDefault, FieldSpec, Record, ValidationErrors,
};
use crate::node::{EntityKind, Node};

pub const EMAIL_MAX_LENGTH: usize = 255;
pub const USERNAME_MAX_LENGTH: usize = 255;
pub const PASSWORD_MAX_LENGTH: usize = 128;
pub const DEFAULT_USERNAME: &str = "noname";
pub const EMAIL_TAKEN: &str = "This email is already exists";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(skip_serializing)]
    pub password: String,
    pub last_login: Option<ChronoDateTimeUtc>,
    #[sea_orm(unique)]
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn set_last_login(mut self) -> Self {
        self.last_login = Set(Some(chrono::Utc::now()));
        self
    }
}

impl Model {
    pub fn full_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id").auto(),
    FieldSpec::new("password").default(FieldDefault::EmptyString),
    FieldSpec::new("last_login").nullable(),
    FieldSpec::new("email").default(FieldDefault::EmptyString),
    FieldSpec::new("username").default(FieldDefault::Str(DEFAULT_USERNAME)),
    FieldSpec::new("is_active").default(FieldDefault::Bool(true)),
    FieldSpec::new("is_staff").default(FieldDefault::Bool(false)),
    FieldSpec::new("is_admin").default(FieldDefault::Bool(false)),
];

#[async_trait]
impl Record for ActiveModel {
    type Model = Model;

    const KIND: EntityKind = EntityKind::User;

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn blank() -> Self {
        Self {
            id: ActiveValue::NotSet,
            password: Set(String::new()),
            last_login: Set(None),
            email: Set(String::new()),
            username: Set(DEFAULT_USERNAME.to_string()),
            is_active: Set(true),
            is_staff: Set(false),
            is_admin: Set(false),
        }
    }

    fn from_model(model: Model) -> Self {
        model.into()
    }

    fn model_from_node(node: Node) -> Option<Model> {
        match node {
            Node::User(user) => Some(user),
            _ => None,
        }
    }

    fn model_pk(model: &Model) -> i32 {
        model.id
    }

    fn set_model_pk(model: &mut Model, pk: i32) {
        model.id = pk;
    }

    fn pk(&self) -> Option<i32> {
        current(&self.id).copied()
    }

    fn write_field(&mut self, field: &str, value: CleanedValue) -> Result<(), String> {
        match field {
            "password" => self.password = Set(value.into_string()?),
            "email" => self.email = Set(value.into_string()?),
            "username" => self.username = Set(value.into_string()?),
            "is_active" => self.is_active = Set(value.into_bool()?),
            "is_staff" => self.is_staff = Set(value.into_bool()?),
            "is_admin" => self.is_admin = Set(value.into_bool()?),
            "last_login" => {
                let last_login = if value.is_null() {
                    None
                } else {
                    Some(value.into_datetime()?)
                };
                self.last_login = Set(last_login);
            }
            _ => {}
        }
        Ok(())
    }

    async fn full_clean(&self, db: &DatabaseConnection) -> Result<ValidationErrors, DbErr> {
        let mut errors = ValidationErrors::new();

        check_required_text(&mut errors, "password", &self.password, Some(PASSWORD_MAX_LENGTH));
        check_required_text(&mut errors, "email", &self.email, Some(EMAIL_MAX_LENGTH));
        if let Some(email) = current(&self.email) {
            if !email.is_empty() && !is_valid_email(email) {
                add_error(&mut errors, "email", "Enter a valid email address.");
            }
        }
        check_required_text(&mut errors, "username", &self.username, Some(USERNAME_MAX_LENGTH));

        if !errors.contains_key("email") {
            if let Some(email) = current(&self.email) {
                let mut taken = Entity::find().filter(Column::Email.eq(email.as_str()));
                if let Some(pk) = self.pk() {
                    taken = taken.filter(Column::Id.ne(pk));
                }
                if taken.one(db).await?.is_some() {
                    add_error(&mut errors, "email", EMAIL_TAKEN);
                }
            }
        }

        Ok(errors)
    }

    async fn persist(self, db: &DatabaseConnection) -> Result<Model, DbErr> {
        match self.pk() {
            None => self.insert(db).await,
            Some(_) if self.is_changed() => self.update(db).await,
            Some(pk) => Entity::find_by_id(pk)
                .one(db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", pk))),
        }
    }

    async fn delete_model(model: &Model, db: &DatabaseConnection) -> Result<(), DbErr> {
        Entity::delete_by_id(model.id).exec(db).await?;
        Ok(())
    }

    /// A concurrent registration can claim the email between the check and the insert
    fn constraint_error(err: &DbErr) -> Option<(&'static str, &'static str)> {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("email") => {
                Some(("email", EMAIL_TAKEN))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("ann"));
        assert!(!is_valid_email("ann@localhost"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn blank_user_uses_field_defaults() {
        let user = <ActiveModel as Record>::blank();
        assert_eq!(user.pk(), None);
        assert_eq!(current(&user.username).map(String::as_str), Some(DEFAULT_USERNAME));
        assert_eq!(current(&user.is_active), Some(&true));
        assert_eq!(current(&user.is_admin), Some(&false));
    }

    #[test]
    fn write_field_converts_values() {
        let mut user = <ActiveModel as Record>::blank();
        user.write_field("is_staff", CleanedValue::Value(serde_json::json!(true)))
            .expect("bool accepted");
        assert_eq!(current(&user.is_staff), Some(&true));

        let err = user
            .write_field("is_admin", CleanedValue::Value(serde_json::json!("yes")))
            .unwrap_err();
        assert_eq!(err, "'yes' value must be either True or False.");
    }
}
