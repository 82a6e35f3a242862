use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidationError;
use validator_derive::Validate;

use crate::shared::{cuit::validate_cuit, role::Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
  pub id: i64,
  #[validate(
    length(
      max = 150,
      message = "Asegúrese de que este valor tenga como máximo 150 caracteres."
    ),
    custom(function = "validate_username")
  )]
  pub username: String,
  #[validate(email(message = "Introduzca una dirección de correo electrónico válida."))]
  pub email: String,
  #[validate(length(max = 150))]
  pub first_name: String,
  #[validate(length(max = 150))]
  pub last_name: String,
  pub role: Role,
  #[validate(custom(function = "validate_cuit"))]
  pub cuit: Option<String>,
  #[validate(length(max = 15))]
  pub phone: String,
  #[validate(length(max = 100))]
  pub specialization: String,
  pub password_hash: String,
  pub is_active: bool,
  pub is_staff: bool,
  pub is_superuser: bool,
  pub last_login: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub const VERBOSE_NAME: &'static str = "Usuario";
  pub const VERBOSE_NAME_PLURAL: &'static str = "Usuarios";

  /// An unsaved account with default flags. The repository assigns `id`.
  pub fn new(username: &str, email: &str) -> Self {
    let now = Utc::now();
    Self {
      id: 0,
      username: username.trim().to_string(),
      email: normalize_email(email),
      first_name: String::new(),
      last_name: String::new(),
      role: Role::default(),
      cuit: None,
      phone: String::new(),
      specialization: String::new(),
      password_hash: String::new(),
      is_active: true,
      is_staff: false,
      is_superuser: false,
      last_login: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_string()
  }

  pub fn is_clinic_manager(&self) -> bool {
    self.role == Role::ClinicManager
  }

  pub fn is_dentist(&self) -> bool {
    self.role == Role::Dentist
  }

  /// Canonical form of the mutable fields, applied on every save.
  pub fn normalize(&mut self) {
    self.email = normalize_email(&self.email);
    self.cuit = normalize_cuit(self.cuit.take());
  }

  /// Bumps `updated_at`, never letting it fall behind `created_at`.
  pub fn touch(&mut self) {
    self.updated_at = Utc::now().max(self.created_at);
  }
}

impl fmt::Display for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.full_name(), self.role.label())
  }
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// Blank CUITs are stored as absent so uniqueness only applies to real ones.
pub fn normalize_cuit(cuit: Option<String>) -> Option<String> {
  cuit
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
  if username.is_empty() {
    return Err(
      ValidationError::new("required")
        .with_message("Este campo es obligatorio.".into()),
    );
  }
  let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
  if username.chars().all(allowed) {
    return Ok(());
  }
  Err(
    ValidationError::new("invalid_username").with_message(
      "Introduzca un nombre de usuario válido: solo letras, números y @/./+/-/_."
        .into(),
    ),
  )
}
