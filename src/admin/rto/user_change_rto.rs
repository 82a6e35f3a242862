use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{hash_worker::describe_hash, role::Role};
use crate::users::model::user::User;

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityFields {
  pub username: String,
  /// Algorithm summary of the stored hash.
  pub password: String,
}

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalInfoFields {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub phone: String,
  pub role: Role,
  pub role_label: String,
  pub cuit: Option<String>,
  pub specialization: String,
}

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionFields {
  pub is_active: bool,
  pub is_staff: bool,
  pub is_superuser: bool,
}

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportantDates {
  pub last_login: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Admin change view, grouped the way the edit form shows it.
#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserChangeRto {
  pub id: i64,
  pub title: String,
  pub identity: IdentityFields,
  pub personal_info: PersonalInfoFields,
  pub permissions: PermissionFields,
  pub important_dates: ImportantDates,
}

impl From<&User> for UserChangeRto {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      title: user.to_string(),
      identity: IdentityFields {
        username: user.username.clone(),
        password: describe_hash(&user.password_hash),
      },
      personal_info: PersonalInfoFields {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        role: user.role,
        role_label: user.role.label().to_string(),
        cuit: user.cuit.clone(),
        specialization: user.specialization.clone(),
      },
      permissions: PermissionFields {
        is_active: user.is_active,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
      },
      important_dates: ImportantDates {
        last_login: user.last_login,
        created_at: user.created_at,
        updated_at: user.updated_at,
      },
    }
  }
}
