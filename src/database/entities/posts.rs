use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::mutation::input::CleanedValue;
use crate::mutation::record::{
    add_error, check_required_text, current, FieldDefault, FieldSpec, Record, ValidationErrors,
};
use crate::node::{EntityKind, Node};

pub const TITLE_MAX_LENGTH: usize = 50;

/// Stored as a small integer in `posts.status`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    #[default]
    Draft = 1,
    Published = 2,
    Archived = 3,
}

impl PostStatus {
    pub fn from_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(PostStatus::Draft),
            2 => Some(PostStatus::Published),
            3 => Some(PostStatus::Archived),
            _ => None,
        }
    }

    pub fn value(self) -> i16 {
        self as i16
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
            PostStatus::Archived => "Archived",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created: ChronoDateTimeUtc,
    pub modified: ChronoDateTimeUtc,
    pub published_date: Option<ChronoDateTimeUtc>,
    pub status: i16,
}

impl Model {
    pub fn post_status(&self) -> Option<PostStatus> {
        PostStatus::from_value(self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id").auto(),
    FieldSpec::new("author_id"),
    FieldSpec::new("title").default(FieldDefault::EmptyString),
    FieldSpec::new("body").default(FieldDefault::EmptyString),
    FieldSpec::new("created").read_only(),
    FieldSpec::new("modified").read_only(),
    FieldSpec::new("published_date").nullable(),
    FieldSpec::new("status").default(FieldDefault::Int(PostStatus::Draft as i64)),
];

#[async_trait]
impl Record for ActiveModel {
    type Model = Model;

    const KIND: EntityKind = EntityKind::Post;

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn blank() -> Self {
        Self {
            id: ActiveValue::NotSet,
            author_id: ActiveValue::NotSet,
            title: Set(String::new()),
            body: Set(String::new()),
            created: ActiveValue::NotSet,
            modified: ActiveValue::NotSet,
            published_date: Set(None),
            status: Set(PostStatus::default().value()),
        }
    }

    fn from_model(model: Model) -> Self {
        model.into()
    }

    fn model_from_node(node: Node) -> Option<Model> {
        match node {
            Node::Post(post) => Some(post),
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
            "author_id" => {
                if value.is_null() {
                    self.author_id = ActiveValue::NotSet;
                } else {
                    match value.into_node()? {
                        Node::User(author) => self.author_id = Set(author.id),
                        other => {
                            return Err(format!(
                                "Select a valid choice. {:?} {} is not one of the available choices.",
                                other.kind(),
                                other.pk()
                            ))
                        }
                    }
                }
            }
            "title" => self.title = Set(value.into_string()?),
            "body" => self.body = Set(value.into_string()?),
            "published_date" => {
                let published = if value.is_null() {
                    None
                } else {
                    Some(value.into_datetime()?)
                };
                self.published_date = Set(published);
            }
            "status" => {
                let raw = value.into_i64()?;
                let status = i16::try_from(raw)
                    .map_err(|_| format!("'{}' value must be an integer.", raw))?;
                self.status = Set(status);
            }
            _ => {}
        }
        Ok(())
    }

    async fn full_clean(&self, _db: &DatabaseConnection) -> Result<ValidationErrors, DbErr> {
        let mut errors = ValidationErrors::new();

        if current(&self.author_id).is_none() {
            add_error(&mut errors, "author_id", "This field cannot be null.");
        }
        check_required_text(&mut errors, "title", &self.title, Some(TITLE_MAX_LENGTH));
        check_required_text(&mut errors, "body", &self.body, None);
        if let Some(status) = current(&self.status) {
            if PostStatus::from_value(*status).is_none() {
                add_error(
                    &mut errors,
                    "status",
                    format!("Value {} is not a valid choice.", status),
                );
            }
        }

        Ok(errors)
    }

    async fn persist(mut self, db: &DatabaseConnection) -> Result<Model, DbErr> {
        let now = Utc::now();
        self.modified = Set(now);
        match self.pk() {
            None => {
                self.created = Set(now);
                self.insert(db).await
            }
            Some(_) => self.update(db).await,
        }
    }

    async fn delete_model(model: &Model, db: &DatabaseConnection) -> Result<(), DbErr> {
        Entity::delete_by_id(model.id).exec(db).await?;
        Ok(())
    }
}
