use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema,
)]
pub enum Role {
  #[default]
  #[serde(rename = "CLINIC")]
  ClinicManager,
  #[serde(rename = "DENTIST")]
  Dentist,
}

impl Role {
  /// Localized label shown to clinic staff.
  pub fn label(&self) -> &'static str {
    match self {
      Role::ClinicManager => "Gestor de Clínica",
      Role::Dentist => "Odontólogo",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
