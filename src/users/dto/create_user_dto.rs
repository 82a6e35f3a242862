use serde::Deserialize;
use utoipa::ToSchema;
use validator_derive::Validate;

use crate::shared::role::Role;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
  pub username: String,
  pub email: String,
  #[validate(length(
    min = 1,
    message = "Password must have at least 1 characters"
  ))]
  pub password: String,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub role: Role,
  #[serde(default)]
  pub cuit: Option<String>,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub specialization: String,
  #[serde(default)]
  pub is_active: Option<bool>,
  #[serde(default)]
  pub is_staff: Option<bool>,
  #[serde(default)]
  pub is_superuser: Option<bool>,
}
