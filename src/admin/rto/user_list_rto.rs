use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::users::model::user::User;

/// One changelist row.
#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserListRto {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub is_active: bool,
}

impl From<&User> for UserListRto {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      username: user.username.clone(),
      email: user.email.clone(),
      is_active: user.is_active,
    }
  }
}

/// The changelist page: model title plus one row per user.
#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserChangelistRto {
  pub title: String,
  pub count: usize,
  pub results: Vec<UserListRto>,
}

impl From<&[User]> for UserChangelistRto {
  fn from(users: &[User]) -> Self {
    Self {
      title: User::VERBOSE_NAME_PLURAL.to_string(),
      count: users.len(),
      results: users.iter().map(UserListRto::from).collect(),
    }
  }
}
