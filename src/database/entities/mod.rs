pub mod posts;
pub mod users;

pub use posts::{Entity as Posts, Model as Post, PostStatus};
pub use users::{Entity as Users, Model as User};
