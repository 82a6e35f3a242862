use serde::Deserialize;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::users::dto::create_user_dto::CreateUserDto;

/// Admin "add user" form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddUserDto {
  pub username: String,
  pub email: String,
  pub password1: String,
  pub password2: String,
  #[serde(default = "default_true")]
  pub is_active: bool,
  #[serde(default)]
  pub is_staff: bool,
}

fn default_true() -> bool {
  true
}

impl AddUserDto {
  pub fn check_passwords(&self) -> Result<(), ValidationErrors> {
    if self.password1 == self.password2 {
      return Ok(());
    }
    let mut errors = ValidationErrors::new();
    errors.add(
      "password2",
      ValidationError::new("password_mismatch")
        .with_message("Los dos campos de contraseña no coinciden.".into()),
    );
    Err(errors)
  }
}

impl From<AddUserDto> for CreateUserDto {
  fn from(dto: AddUserDto) -> Self {
    Self {
      username: dto.username,
      email: dto.email,
      password: dto.password1,
      is_active: Some(dto.is_active),
      is_staff: Some(dto.is_staff),
      ..Default::default()
    }
  }
}
