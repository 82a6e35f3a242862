use thiserror::Error;
use tracing::{debug, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::shared::hash_worker::{HashWorkerError, Hasher};
use crate::users::dto::create_user_dto::CreateUserDto;
use crate::users::model::user::User;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository, UserRepositoryError,
};

#[derive(Debug, Error)]
pub enum AccountError {
  #[error("username is required.")]
  MissingUsername,
  #[error("email is required.")]
  MissingEmail,
  #[error("Superuser must have {0}=true.")]
  SuperuserFlag(&'static str),
  #[error("Validation failed: {0}")]
  Validation(#[from] ValidationErrors),
  #[error("Integrity error: {0}")]
  Integrity(UserRepositoryError),
  #[error("User not found")]
  NotFound,
  #[error("Repository error: {0}")]
  Repository(UserRepositoryError),
  #[error("Password hashing error: {0}")]
  Hash(#[from] HashWorkerError),
}

impl From<UserRepositoryError> for AccountError {
  fn from(error: UserRepositoryError) -> Self {
    match error {
      UserRepositoryError::Duplicate(_) => AccountError::Integrity(error),
      UserRepositoryError::NotFound => AccountError::NotFound,
      other => AccountError::Repository(other),
    }
  }
}

/// Account lifecycle over a repository: creation, validation, saving.
pub struct UserManager<'a, UR: UserRepository> {
  repository: &'a UR,
  hasher: &'a dyn Hasher,
}

impl<'a, UR: UserRepository> UserManager<'a, UR> {
  pub fn new(repository: &'a UR, hasher: &'a dyn Hasher) -> Self {
    Self { repository, hasher }
  }

  pub async fn create_user(
    &self,
    dto: CreateUserDto,
  ) -> Result<User, AccountError> {
    self.create(dto, false).await
  }

  pub async fn create_superuser(
    &self,
    dto: CreateUserDto,
  ) -> Result<User, AccountError> {
    if dto.is_staff == Some(false) {
      return Err(AccountError::SuperuserFlag("is_staff"));
    }
    if dto.is_superuser == Some(false) {
      return Err(AccountError::SuperuserFlag("is_superuser"));
    }
    self.create(dto, true).await
  }

  async fn create(
    &self,
    dto: CreateUserDto,
    superuser: bool,
  ) -> Result<User, AccountError> {
    if dto.username.trim().is_empty() {
      return Err(AccountError::MissingUsername);
    }
    if dto.email.trim().is_empty() {
      return Err(AccountError::MissingEmail);
    }
    dto.validate()?;

    let mut user = User::new(&dto.username, &dto.email);
    user.first_name = dto.first_name;
    user.last_name = dto.last_name;
    user.role = dto.role;
    user.cuit = dto.cuit;
    user.phone = dto.phone;
    user.specialization = dto.specialization;
    user.is_active = dto.is_active.unwrap_or(true);
    user.is_staff = dto.is_staff.unwrap_or(superuser);
    user.is_superuser = dto.is_superuser.unwrap_or(superuser);
    user.normalize();

    self.full_clean(&user).await?;
    user.password_hash = self.hasher.hash_password(&dto.password).await?;

    let user = self.repository.create(user).await?;
    info!("Created user {} ({})", user.id, user.username);
    Ok(user)
  }

  /// Field validation plus uniqueness checks against the stored accounts.
  /// `user.id` identifies the account itself, so saving it unchanged passes.
  pub async fn full_clean(&self, user: &User) -> Result<(), AccountError> {
    let mut errors = match user.validate() {
      Ok(()) => ValidationErrors::new(),
      Err(errors) => errors,
    };

    if self
      .is_taken(user, FindOneProperty::Username(&user.username))
      .await?
    {
      errors.add(
        "username",
        unique_error("Ya existe un usuario con este nombre de usuario."),
      );
    }
    if self.is_taken(user, FindOneProperty::Email(&user.email)).await? {
      errors.add(
        "email",
        unique_error("Ya existe un usuario con este correo electrónico."),
      );
    }
    if let Some(cuit) = user.cuit.as_deref() {
      if self.is_taken(user, FindOneProperty::Cuit(cuit)).await? {
        errors.add("cuit", unique_error("Ya existe un usuario con este CUIT."));
      }
    }

    if errors.is_empty() {
      Ok(())
    } else {
      debug!("Validation failed for user {:?}: {}", user.username, errors);
      Err(AccountError::Validation(errors))
    }
  }

  async fn is_taken(
    &self,
    user: &User,
    property: FindOneProperty<'_>,
  ) -> Result<bool, AccountError> {
    match self.repository.find_one(property).await {
      Ok(other) => Ok(other.id != user.id),
      Err(UserRepositoryError::NotFound) => Ok(false),
      Err(error) => Err(AccountError::from(error)),
    }
  }

  /// Normalizes, validates and persists an existing account.
  pub async fn save(&self, mut user: User) -> Result<User, AccountError> {
    user.normalize();
    user.touch();
    self.full_clean(&user).await?;
    self.repository.update(user.clone()).await?;
    debug!("Saved user {}", user.id);
    Ok(user)
  }

  pub async fn set_password(
    &self,
    mut user: User,
    password: &str,
  ) -> Result<User, AccountError> {
    user.password_hash = self.hasher.hash_password(password).await?;
    self.save(user).await
  }

  #[cfg(test)]
  async fn check_password(
    &self,
    user: &User,
    password: &str,
  ) -> Result<bool, AccountError> {
    if user.password_hash.is_empty() {
      return Ok(false);
    }
    Ok(
      self
        .hasher
        .verify_password(password, &user.password_hash)
        .await?,
    )
  }

  pub async fn get(&self, id: i64) -> Result<User, AccountError> {
    Ok(self.repository.find_one(FindOneProperty::Id(id)).await?)
  }

  pub async fn list(&self) -> Result<Vec<User>, AccountError> {
    let mut users = self.repository.find_all().await?;
    users.sort_by_key(|user| user.id);
    Ok(users)
  }

  pub async fn delete(&self, id: i64) -> Result<(), AccountError> {
    self.repository.delete(id).await?;
    info!("Deleted user {}", id);
    Ok(())
  }
}

fn unique_error(message: &'static str) -> ValidationError {
  ValidationError::new("unique").with_message(message.into())
}
