use serde::Deserialize;
use utoipa::ToSchema;

use crate::{shared::role::Role, users::model::user::User};

/// Admin "change user" form. Absent fields keep their stored value; an
/// empty `cuit` clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChangeUserDto {
  pub username: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub role: Option<Role>,
  pub cuit: Option<String>,
  pub specialization: Option<String>,
  pub is_active: Option<bool>,
  pub is_staff: Option<bool>,
  pub is_superuser: Option<bool>,
}

impl ChangeUserDto {
  pub fn apply(self, user: &mut User) {
    if let Some(username) = self.username {
      user.username = username.trim().to_string();
    }
    if let Some(first_name) = self.first_name {
      user.first_name = first_name;
    }
    if let Some(last_name) = self.last_name {
      user.last_name = last_name;
    }
    if let Some(email) = self.email {
      user.email = email;
    }
    if let Some(phone) = self.phone {
      user.phone = phone;
    }
    if let Some(role) = self.role {
      user.role = role;
    }
    if self.cuit.is_some() {
      user.cuit = self.cuit;
    }
    if let Some(specialization) = self.specialization {
      user.specialization = specialization;
    }
    if let Some(is_active) = self.is_active {
      user.is_active = is_active;
    }
    if let Some(is_staff) = self.is_staff {
      user.is_staff = is_staff;
    }
    if let Some(is_superuser) = self.is_superuser {
      user.is_superuser = is_superuser;
    }
  }
}
