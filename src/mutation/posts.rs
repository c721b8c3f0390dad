//! Post mutations

use super::engine::ModelMutation;
use super::input::{InputField, MutationArgs};
use crate::auth::Principal;
use crate::database::entities::posts;
use crate::node::{EntityKind, GlobalId};

pub type PostRecord = posts::ActiveModel;

const CREATE_INPUT: &[InputField] = &[
    InputField::scalar("title"),
    InputField::scalar("body"),
    InputField::scalar("published_date"),
    InputField::scalar("status"),
    InputField::id("author_id", Some(EntityKind::User)),
];

const UPDATE_INPUT: &[InputField] = &[
    InputField::scalar("title"),
    InputField::scalar("body"),
    InputField::scalar("published_date"),
    InputField::scalar("status"),
];

pub fn create_post() -> ModelMutation<PostRecord> {
    ModelMutation::new("createPost")
        .input(CREATE_INPUT)
        .allow(may_write_as_author)
}

pub fn update_post() -> ModelMutation<PostRecord> {
    ModelMutation::new("updatePost")
        .input(UPDATE_INPUT)
        .allow(is_authenticated)
        .allow_target(is_author_or_privileged)
}

pub fn delete_post() -> ModelMutation<PostRecord> {
    ModelMutation::new("deletePost")
        .allow(is_authenticated)
        .allow_target(is_author_or_privileged)
}

fn is_authenticated(principal: &Principal, _args: &MutationArgs) -> bool {
    principal.is_authenticated
}

/// Staff and admins may post for anyone; other users only as themselves
fn may_write_as_author(principal: &Principal, args: &MutationArgs) -> bool {
    if !principal.is_authenticated {
        return false;
    }
    if principal.is_privileged() {
        return true;
    }
    args.input
        .str("author_id")
        .and_then(GlobalId::decode)
        .map_or(false, |author| principal.is(author.pk))
}

fn is_author_or_privileged(principal: &Principal, post: &posts::Model) -> bool {
    principal.is(post.author_id) || principal.is_privileged()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::input::RawInput;

    fn create_args(author: &str) -> MutationArgs {
        MutationArgs::create(RawInput::new().with("title", "t").with("author_id", author))
    }

    #[test]
    fn authors_post_as_themselves() {
        let own = GlobalId::new("UserType", 5).encode();
        let other = GlobalId::new("UserType", 6).encode();

        assert!(may_write_as_author(&Principal::user(5), &create_args(&own)));
        assert!(!may_write_as_author(&Principal::user(5), &create_args(&other)));
        assert!(may_write_as_author(&Principal::user(5).with_admin(), &create_args(&other)));
        assert!(!may_write_as_author(&Principal::anonymous(), &create_args(&own)));
        assert!(!may_write_as_author(&Principal::user(5), &create_args("garbage")));
    }
}
