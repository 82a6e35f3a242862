use std::sync::{
  atomic::{AtomicI64, Ordering},
  Arc, RwLock,
};

use thiserror::Error;

use crate::users::model::user::User;

#[derive(Debug, Error)]
pub enum UserRepositoryError {
  #[cfg(feature = "mongodb")]
  #[error("MongoDB error: {0}")]
  Mongo(#[from] mongodb::error::Error),

  #[error("A user with this {0} already exists")]
  Duplicate(&'static str),

  #[error("User not found")]
  NotFound,

  #[error("Other error: {0}")]
  Other(String),
}

#[derive(Debug, Clone, Copy)]
pub enum FindOneProperty<'a> {
  Id(i64),
  Username(&'a str),
  Email(&'a str),
  Cuit(&'a str),
}

impl FindOneProperty<'_> {
  fn matches(&self, user: &User) -> bool {
    match *self {
      FindOneProperty::Id(id) => user.id == id,
      FindOneProperty::Username(username) => user.username == username,
      FindOneProperty::Email(email) => user.email == email,
      FindOneProperty::Cuit(cuit) => user.cuit.as_deref() == Some(cuit),
    }
  }
}

/// Storage of user accounts. Implementations enforce uniqueness of
/// username, email and CUIT, and hand out strictly increasing ids.
pub trait UserRepository {
  async fn find_one(
    &self,
    property: FindOneProperty,
  ) -> Result<User, UserRepositoryError>;
  /// All users ordered by id.
  async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError>;
  /// Stores a new user, ignoring `user.id`, and returns it with its id.
  async fn create(&self, user: User) -> Result<User, UserRepositoryError>;
  async fn update(&self, user: User) -> Result<(), UserRepositoryError>;
  async fn delete(&self, id: i64) -> Result<(), UserRepositoryError>;
}

/// Returns the first unique field of `candidate` already taken by another
/// user in `users`.
fn find_conflict(users: &[User], candidate: &User) -> Option<&'static str> {
  let others = || users.iter().filter(|user| user.id != candidate.id);
  if others().any(|user| user.username == candidate.username) {
    return Some("username");
  }
  if others().any(|user| user.email == candidate.email) {
    return Some("email");
  }
  if candidate.cuit.is_some() && others().any(|user| user.cuit == candidate.cuit)
  {
    return Some("cuit");
  }
  None
}

// ### In-memory implementation ###

#[derive(Clone)]
pub struct InMemoryUserRepository {
  pub users: Arc<RwLock<Vec<User>>>,
  next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
  pub fn new() -> Self {
    Self {
      users: Arc::new(RwLock::new(Vec::new())),
      next_id: Arc::new(AtomicI64::new(1)),
    }
  }
}

impl Default for InMemoryUserRepository {
  fn default() -> Self {
    Self::new()
  }
}

fn poisoned<T>(_: T) -> UserRepositoryError {
  UserRepositoryError::Other(String::from("user store lock poisoned"))
}

impl UserRepository for InMemoryUserRepository {
  async fn find_one<'a>(
    &self,
    property: FindOneProperty<'a>,
  ) -> Result<User, UserRepositoryError> {
    let users = self.users.read().map_err(poisoned)?;
    users
      .iter()
      .find(|user| property.matches(user))
      .cloned()
      .ok_or(UserRepositoryError::NotFound)
  }

  async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError> {
    let users = self.users.read().map_err(poisoned)?;
    Ok(users.clone())
  }

  async fn create(&self, mut user: User) -> Result<User, UserRepositoryError> {
    let mut users = self.users.write().map_err(poisoned)?;
    // Ids are only ever handed out here, so 0 never collides.
    user.id = 0;
    if let Some(field) = find_conflict(&users, &user) {
      return Err(UserRepositoryError::Duplicate(field));
    }
    user.id = self.next_id.fetch_add(1, Ordering::SeqCst);
    users.push(user.clone());
    Ok(user)
  }

  async fn update(&self, user: User) -> Result<(), UserRepositoryError> {
    let mut users = self.users.write().map_err(poisoned)?;
    if let Some(field) = find_conflict(&users, &user) {
      return Err(UserRepositoryError::Duplicate(field));
    }
    let stored = users
      .iter_mut()
      .find(|stored| stored.id == user.id)
      .ok_or(UserRepositoryError::NotFound)?;
    *stored = user;
    Ok(())
  }

  async fn delete(&self, id: i64) -> Result<(), UserRepositoryError> {
    let mut users = self.users.write().map_err(poisoned)?;
    let position = users
      .iter()
      .position(|user| user.id == id)
      .ok_or(UserRepositoryError::NotFound)?;
    users.remove(position);
    Ok(())
  }
}

// ### MongoDB implementation ###

#[cfg(feature = "mongodb")]
pub use mongo::MongoUserRepository;

#[cfg(feature = "mongodb")]
mod mongo {
  use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
  };
  use tracing::info;

  use super::{FindOneProperty, UserRepository, UserRepositoryError};
  use crate::{shared::database::MongoDatabase, users::model::user::User};

  const DUPLICATE_KEY: i32 = 11000;

  pub struct MongoUserRepository {
    database: MongoDatabase,
  }

  impl MongoUserRepository {
    pub fn new(database: MongoDatabase) -> Self {
      Self { database }
    }

    fn users(&self) -> Collection<User> {
      self.database.database().collection("users")
    }

    /// Creates the unique indexes the repository relies on. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<(), UserRepositoryError> {
      let unique = |keys: Document| {
        IndexModel::builder()
          .keys(keys)
          .options(IndexOptions::builder().unique(true).build())
          .build()
      };
      let cuit = IndexModel::builder()
        .keys(doc! { "cuit": 1 })
        .options(
          IndexOptions::builder()
            .unique(true)
            .partial_filter_expression(doc! { "cuit": { "$type": "string" } })
            .build(),
        )
        .build();
      self
        .users()
        .create_indexes(vec![
          unique(doc! { "id": 1 }),
          unique(doc! { "username": 1 }),
          unique(doc! { "email": 1 }),
          cuit,
        ])
        .await?;
      info!("User indexes ready on {}", self.database.database_name);
      Ok(())
    }

    async fn next_id(&self) -> Result<i64, UserRepositoryError> {
      let counters: Collection<Document> =
        self.database.database().collection("counters");
      let counter = counters
        .find_one_and_update(
          doc! { "_id": "users" },
          doc! { "$inc": { "seq": 1_i64 } },
        )
        .with_options(
          FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build(),
        )
        .await?
        .ok_or_else(|| {
          UserRepositoryError::Other(String::from("id counter missing"))
        })?;
      counter
        .get_i64("seq")
        .map_err(|error| UserRepositoryError::Other(error.to_string()))
    }
  }

  fn filter(property: FindOneProperty) -> Document {
    match property {
      FindOneProperty::Id(id) => doc! { "id": id },
      FindOneProperty::Username(username) => doc! { "username": username },
      FindOneProperty::Email(email) => doc! { "email": email },
      FindOneProperty::Cuit(cuit) => doc! { "cuit": cuit },
    }
  }

  /// Maps duplicate-key write errors onto the field whose index fired.
  fn map_write_error(error: mongodb::error::Error) -> UserRepositoryError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) =
      error.kind.as_ref()
    {
      if write_error.code == DUPLICATE_KEY {
        let field = ["username", "email", "cuit"]
          .into_iter()
          .find(|field| write_error.message.contains(field))
          .unwrap_or("key");
        return UserRepositoryError::Duplicate(field);
      }
    }
    UserRepositoryError::Mongo(error)
  }

  impl UserRepository for MongoUserRepository {
    async fn find_one<'a>(
      &self,
      property: FindOneProperty<'a>,
    ) -> Result<User, UserRepositoryError> {
      self
        .users()
        .find_one(filter(property))
        .await?
        .ok_or(UserRepositoryError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError> {
      let mut cursor = self.users().find(doc! {}).sort(doc! { "id": 1 }).await?;
      let mut users = Vec::new();
      while cursor.advance().await? {
        users.push(cursor.deserialize_current()?);
      }
      Ok(users)
    }

    async fn create(&self, mut user: User) -> Result<User, UserRepositoryError> {
      user.id = self.next_id().await?;
      self
        .users()
        .insert_one(&user)
        .await
        .map_err(map_write_error)?;
      Ok(user)
    }

    async fn update(&self, user: User) -> Result<(), UserRepositoryError> {
      let result = self
        .users()
        .replace_one(doc! { "id": user.id }, &user)
        .await
        .map_err(map_write_error)?;
      if result.matched_count == 0 {
        return Err(UserRepositoryError::NotFound);
      }
      Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), UserRepositoryError> {
      let result = self.users().delete_one(doc! { "id": id }).await?;
      if result.deleted_count == 0 {
        return Err(UserRepositoryError::NotFound);
      }
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(username: &str, email: &str, cuit: Option<&str>) -> User {
    let mut user = User::new(username, email);
    user.cuit = cuit.map(String::from);
    user
  }

  #[actix_web::test]
  async fn test_create_assigns_increasing_ids() {
    let repository = InMemoryUserRepository::new();
    let first = repository.create(user("a", "a@x.com", None)).await.unwrap();
    let second = repository.create(user("b", "b@x.com", None)).await.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);

    repository.delete(second.id).await.unwrap();
    let third = repository.create(user("c", "c@x.com", None)).await.unwrap();
    assert_eq!(third.id, 3, "ids are never reused");
  }

  #[actix_web::test]
  async fn test_uniqueness_is_enforced() {
    let repository = InMemoryUserRepository::new();
    repository
      .create(user("a", "a@x.com", Some("20-12345678-6")))
      .await
      .unwrap();

    let error = repository
      .create(user("a", "other@x.com", None))
      .await
      .unwrap_err();
    assert!(matches!(error, UserRepositoryError::Duplicate("username")));

    let error = repository.create(user("b", "a@x.com", None)).await.unwrap_err();
    assert!(matches!(error, UserRepositoryError::Duplicate("email")));

    let error = repository
      .create(user("b", "b@x.com", Some("20-12345678-6")))
      .await
      .unwrap_err();
    assert!(matches!(error, UserRepositoryError::Duplicate("cuit")));

    // Absent CUITs never collide.
    repository.create(user("b", "b@x.com", None)).await.unwrap();
    repository.create(user("c", "c@x.com", None)).await.unwrap();
    assert_eq!(repository.find_all().await.unwrap().len(), 3);
  }

  #[actix_web::test]
  async fn test_find_update_and_delete() {
    let repository = InMemoryUserRepository::new();
    let mut stored = repository
      .create(user("ana", "ana@x.com", Some("27-11111111-7")))
      .await
      .unwrap();

    let found = repository
      .find_one(FindOneProperty::Cuit("27-11111111-7"))
      .await
      .unwrap();
    assert_eq!(found.id, stored.id);

    stored.phone = String::from("1234567890");
    repository.update(stored.clone()).await.unwrap();
    let found = repository
      .find_one(FindOneProperty::Username("ana"))
      .await
      .unwrap();
    assert_eq!(found.phone, "1234567890");

    repository.delete(stored.id).await.unwrap();
    assert!(matches!(
      repository.find_one(FindOneProperty::Id(stored.id)).await,
      Err(UserRepositoryError::NotFound)
    ));
    assert!(matches!(
      repository.delete(stored.id).await,
      Err(UserRepositoryError::NotFound)
    ));
  }
}
