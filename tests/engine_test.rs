//! Mutation engine and node resolution tests against a real SQLite database

use std::sync::Arc;

use anyhow::Result;
use inkpost::auth::Principal;
use inkpost::database::entities::{posts, users, PostStatus};
use inkpost::database::setup_database;
use inkpost::errors::CoreErrorKind;
use inkpost::mutation::{posts as post_mutations, users as user_mutations};
use inkpost::mutation::posts::PostRecord;
use inkpost::mutation::{
    FieldError, InputField, ModelMutation, MutationArgs, MutationEngine, RawInput, Record,
};
use inkpost::node::{to_global_id, EntityKind, Node, NodeResolver, ResolveError, TypeRegistry};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use tempfile::NamedTempFile;

async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());
    let db = setup_database(&db_url).await?;
    Ok((db, temp_file))
}

fn engine(db: &DatabaseConnection) -> MutationEngine {
    MutationEngine::new(db.clone(), Arc::new(TypeRegistry::blog()))
}

/// Insert a user directly, skipping password hashing
async fn seed_user(db: &DatabaseConnection, email: &str) -> Result<users::Model> {
    let user = users::ActiveModel {
        password: Set("not-a-real-hash".to_string()),
        last_login: Set(None),
        email: Set(email.to_string()),
        username: Set(email.split('@').next().unwrap_or("noname").to_string()),
        is_active: Set(true),
        is_staff: Set(false),
        is_admin: Set(false),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

fn user_id(user: &users::Model) -> String {
    to_global_id("UserType", user.id)
}

fn post_id(post: &posts::Model) -> String {
    to_global_id("PostType", post.id)
}

fn post_input(author: &users::Model) -> RawInput {
    RawInput::new()
        .with("title", "First post")
        .with("body", "Hello there")
        .with("author_id", user_id(author))
}

async fn post_count(db: &DatabaseConnection) -> Result<u64> {
    Ok(posts::Entity::find().count(db).await?)
}

#[tokio::test]
async fn resolve_many_returns_rows_in_input_order() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let a = seed_user(&db, "a@example.com").await?;
    let b = seed_user(&db, "b@example.com").await?;

    let resolver = NodeResolver::new(db.clone(), Arc::new(TypeRegistry::blog()));
    let nodes = resolver
        .resolve_many(&[user_id(&b), user_id(&a)], Some(EntityKind::User))
        .await?;

    let pks: Vec<i32> = nodes.iter().map(Node::pk).collect();
    assert_eq!(pks, vec![b.id, a.id]);
    Ok(())
}

#[tokio::test]
async fn resolve_many_reports_bad_lists() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let a = seed_user(&db, "a@example.com").await?;
    let resolver = NodeResolver::new(db.clone(), Arc::new(TypeRegistry::blog()));

    let mixed = resolver
        .resolve_many(&[user_id(&a), to_global_id("PostType", 1)], None)
        .await;
    assert!(matches!(
        mixed,
        Err(ResolveError::Unresolved(ref message)) if message == "Received IDs of more than one type."
    ));

    let missing = resolver
        .resolve_many(&[user_id(&a), to_global_id("UserType", 999)], None)
        .await;
    assert!(matches!(
        missing,
        Err(ResolveError::Unresolved(ref message)) if message == "There is no node of type UserType with pk 999"
    ));

    let wrong_type = resolver
        .resolve(&to_global_id("PostType", a.id), Some(EntityKind::User))
        .await;
    assert!(matches!(
        wrong_type,
        Err(ResolveError::Unresolved(ref message)) if message == "Must receive a UserType id."
    ));
    Ok(())
}

#[tokio::test]
async fn post_without_status_is_a_draft() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;

    let result = engine(&db)
        .mutate(
            &post_mutations::create_post(),
            &Principal::from(&author),
            MutationArgs::create(post_input(&author)),
        )
        .await?;

    assert!(result.is_success(), "unexpected errors: {:?}", result.errors);
    let post = result.instance.expect("created post");
    assert_eq!(post.status, 1);
    assert_eq!(post.author_id, author.id);
    assert!(post.published_date.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_create_writes_nothing_and_retry_succeeds() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let engine = engine(&db);
    let principal = Principal::from(&author);

    let mut input = post_input(&author);
    input.insert("title", "");
    let failed = engine
        .mutate(&post_mutations::create_post(), &principal, MutationArgs::create(input))
        .await?;

    assert!(failed.instance.is_none());
    assert_eq!(
        failed.errors,
        vec![FieldError::for_field("title", "This field cannot be blank.")]
    );
    assert_eq!(post_count(&db).await?, 0);

    let retried = engine
        .mutate(
            &post_mutations::create_post(),
            &principal,
            MutationArgs::create(post_input(&author)),
        )
        .await?;
    assert!(retried.is_success());
    assert_eq!(post_count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn unresolvable_ids_become_field_errors() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let engine = engine(&db);
    let principal = Principal::from(&author).with_staff();

    let mut input = post_input(&author);
    input.insert("author_id", to_global_id("PostType", 3));
    let result = engine
        .mutate(&post_mutations::create_post(), &principal, MutationArgs::create(input))
        .await?;
    assert_eq!(
        result.errors.first(),
        Some(&FieldError::for_field("author_id", "Must receive a UserType id."))
    );
    assert_eq!(result.errors[0].field.as_deref(), Some("authorId"));

    let result = engine
        .mutate(
            &post_mutations::update_post(),
            &principal,
            MutationArgs::update("xyz", RawInput::new().with("title", "Renamed")),
        )
        .await?;
    assert_eq!(
        result.errors,
        vec![FieldError::for_field("id", "Couldn't resolve to a node: xyz")]
    );
    assert_eq!(post_count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn permission_denied_writes_nothing() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;

    let err = engine(&db)
        .mutate(
            &post_mutations::create_post(),
            &Principal::anonymous(),
            MutationArgs::create(post_input(&author)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert_eq!(err.message(), "You do not have permission to perform this action");
    assert_eq!(post_count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn only_owners_and_staff_delete_posts() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let stranger = seed_user(&db, "stranger@example.com").await?;
    let engine = engine(&db);

    let post = engine
        .mutate(
            &post_mutations::create_post(),
            &Principal::from(&author),
            MutationArgs::create(post_input(&author)),
        )
        .await?
        .instance
        .expect("created post");

    let err = engine
        .delete(
            &post_mutations::delete_post(),
            &Principal::from(&stranger),
            MutationArgs::delete(post_id(&post)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert!(posts::Entity::find_by_id(post.id).one(&db).await?.is_some());

    let deleted = engine
        .delete(
            &post_mutations::delete_post(),
            &Principal::from(&author),
            MutationArgs::delete(post_id(&post)),
        )
        .await?;
    assert!(deleted.is_success());
    assert_eq!(deleted.instance.map(|p| p.id), Some(post.id));
    assert_eq!(post_count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn update_post_changes_only_given_fields() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let engine = engine(&db);
    let principal = Principal::from(&author);

    let post = engine
        .mutate(
            &post_mutations::create_post(),
            &principal,
            MutationArgs::create(post_input(&author)),
        )
        .await?
        .instance
        .expect("created post");

    let updated = engine
        .mutate(
            &post_mutations::update_post(),
            &principal,
            MutationArgs::update(
                post_id(&post),
                RawInput::new()
                    .with("status", 2)
                    .with("published_date", "2024-05-01T10:00:00Z"),
            ),
        )
        .await?
        .instance
        .expect("updated post");

    assert_eq!(updated.id, post.id);
    assert_eq!(updated.title, "First post");
    assert_eq!(updated.status, 2);
    assert!(updated.published_date.is_some());
    assert_eq!(updated.created, post.created);

    let invalid = engine
        .mutate(
            &post_mutations::update_post(),
            &principal,
            MutationArgs::update(post_id(&post), RawInput::new().with("status", 9)),
        )
        .await?;
    assert_eq!(
        invalid.errors,
        vec![FieldError::for_field("status", "Value 9 is not a valid choice.")]
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    seed_user(&db, "taken@example.com").await?;

    let result = engine(&db)
        .mutate(
            &user_mutations::register_user(),
            &Principal::anonymous(),
            MutationArgs::create(
                RawInput::new()
                    .with("email", "taken@EXAMPLE.com")
                    .with("username", "copycat")
                    .with("password", "pw-123456"),
            ),
        )
        .await?;

    assert_eq!(
        result.errors,
        vec![FieldError::for_field("email", "This email is already exists")]
    );
    assert_eq!(users::Entity::find().count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn bad_flag_values_are_reported_in_camel_case() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let result = engine(&db)
        .mutate(
            &user_mutations::register_user(),
            &Principal::anonymous(),
            MutationArgs::create(
                RawInput::new()
                    .with("email", "new@example.com")
                    .with("username", "new")
                    .with("password", "pw-123456")
                    .with("is_active", json!("yes")),
            ),
        )
        .await?;

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field.as_deref(), Some("isActive"));
    assert_eq!(
        result.errors[0].message,
        "'yes' value must be either True or False."
    );
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_grant_admin() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = seed_user(&db, "user@example.com").await?;

    let result = engine(&db)
        .mutate(
            &user_mutations::update_user(),
            &Principal::from(&user),
            MutationArgs::update(
                user_id(&user),
                RawInput::new().with("is_admin", true).with("is_active", false),
            ),
        )
        .await?;

    let updated = result.instance.expect("update succeeds");
    assert!(!updated.is_admin);
    assert!(!updated.is_active);
    Ok(())
}

#[tokio::test]
async fn users_delete_themselves_but_not_others() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = seed_user(&db, "user@example.com").await?;
    let other = seed_user(&db, "other@example.com").await?;
    let engine = engine(&db);

    let err = engine
        .delete(
            &user_mutations::delete_user(),
            &Principal::from(&user),
            MutationArgs::delete(user_id(&other)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);

    let deleted = engine
        .delete(
            &user_mutations::delete_user(),
            &Principal::from(&user),
            MutationArgs::delete(user_id(&user)),
        )
        .await?;
    assert_eq!(deleted.instance.map(|u| u.id), Some(user.id));
    assert_eq!(users::Entity::find().count(&db).await?, 1);
    Ok(())
}

const LINKED_POST_INPUT: &[InputField] = &[
    InputField::scalar("title"),
    InputField::scalar("body"),
    InputField::id("author_id", Some(EntityKind::User)),
    InputField::id_list("related_posts", Some(EntityKind::Post)),
];

/// A post mutation that also accepts a list of related post ids
fn create_linked_post() -> ModelMutation<PostRecord> {
    ModelMutation::new("createLinkedPost").input(LINKED_POST_INPUT)
}

#[tokio::test]
async fn id_list_inputs_report_one_error_per_field() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let engine = engine(&db);
    let principal = Principal::from(&author);
    let mutation = create_linked_post();

    let linked = |related: serde_json::Value| {
        MutationArgs::create(post_input(&author).with("related_posts", related))
    };

    let undecodable = engine
        .mutate(&mutation, &principal, linked(json!(["garbage"])))
        .await?;
    assert_eq!(
        undecodable.errors,
        vec![FieldError::for_field(
            "related_posts",
            "Could not resolve to a nodes with the global id list of '['garbage']'."
        )]
    );
    assert_eq!(undecodable.errors[0].field.as_deref(), Some("relatedPosts"));

    let wrong_type = engine
        .mutate(&mutation, &principal, linked(json!([user_id(&author)])))
        .await?;
    assert_eq!(
        wrong_type.errors,
        vec![FieldError::for_field("related_posts", "Must receive a PostType id.")]
    );

    let not_a_list = engine
        .mutate(&mutation, &principal, linked(json!("x")))
        .await?;
    assert_eq!(
        not_a_list.errors,
        vec![FieldError::for_field("related_posts", "Enter a list of valid IDs.")]
    );
    assert_eq!(post_count(&db).await?, 0);

    let empty = engine
        .mutate(&mutation, &principal, linked(json!([])))
        .await?;
    assert!(empty.is_success(), "unexpected errors: {:?}", empty.errors);
    let first = empty.instance.expect("created post");

    let related = engine
        .mutate(&mutation, &principal, linked(json!([post_id(&first)])))
        .await?;
    assert!(related.is_success(), "unexpected errors: {:?}", related.errors);
    assert_eq!(post_count(&db).await?, 2);
    Ok(())
}

fn keep_published(post: &posts::Model) -> Vec<FieldError> {
    if post.post_status() == Some(PostStatus::Published) {
        vec![FieldError::non_field("Published posts cannot be deleted.")]
    } else {
        Vec::new()
    }
}

#[tokio::test]
async fn pre_delete_errors_keep_the_row() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let author = seed_user(&db, "author@example.com").await?;
    let engine = engine(&db);
    let principal = Principal::from(&author);

    let post = engine
        .mutate(
            &post_mutations::create_post(),
            &principal,
            MutationArgs::create(post_input(&author).with("status", 2)),
        )
        .await?
        .instance
        .expect("created post");

    let guarded = post_mutations::delete_post().before_delete(keep_published);
    let result = engine
        .delete(&guarded, &principal, MutationArgs::delete(post_id(&post)))
        .await?;

    assert!(!result.is_success());
    assert!(result.instance.is_none());
    assert_eq!(
        result.errors,
        vec![FieldError::non_field("Published posts cannot be deleted.")]
    );
    assert!(posts::Entity::find_by_id(post.id).one(&db).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn email_taken_after_validation_maps_to_field_error() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    seed_user(&db, "race@example.com").await?;

    // Validation already passed for this row; the unique index still rejects it
    let mut late = <users::ActiveModel as Record>::blank();
    late.email = Set("race@example.com".to_string());
    late.password = Set("not-a-real-hash".to_string());
    let err = late.persist(&db).await.unwrap_err();

    assert_eq!(
        users::ActiveModel::constraint_error(&err),
        Some(("email", "This email is already exists"))
    );
    assert_eq!(
        users::ActiveModel::constraint_error(&DbErr::Custom("disk full".to_string())),
        None
    );
    assert_eq!(users::Entity::find().count(&db).await?, 1);
    Ok(())
}
