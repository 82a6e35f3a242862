use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
  #[cfg(feature = "mongodb")]
  #[error("MongoDB error: {0}")]
  Mongo(#[from] mongodb::error::Error),

  #[error("Database unavailable: {0}")]
  Unavailable(String),
}

/// A store whose availability can be probed.
pub trait Database {
  fn name(&self) -> &str;
  async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Process-local store used when no database backend is compiled in.
/// It is available as soon as the process runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDatabase;

impl Database for InMemoryDatabase {
  fn name(&self) -> &str {
    "memory"
  }

  async fn ping(&self) -> Result<(), DatabaseError> {
    Ok(())
  }
}

#[cfg(feature = "mongodb")]
pub use mongo::{MongoConnector, MongoDatabase};

#[cfg(feature = "mongodb")]
mod mongo {
  use std::cell::RefCell;
  use std::time::Duration;

  use mongodb::{bson::doc, options::ClientOptions, Client};

  use super::{Database, DatabaseError};
  use crate::shared::config::Config;

  // Bounds a single ping so one wait_for_db attempt cannot hang.
  const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(2);

  #[derive(Clone)]
  pub struct MongoDatabase {
    pub mongo_client: Client,
    pub database_name: String,
  }

  impl MongoDatabase {
    /// Parses the connection string and builds a lazily connecting client.
    pub async fn new(config: &Config) -> Result<Self, DatabaseError> {
      let mut options = ClientOptions::parse(&config.database_url).await?;
      options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
      options.app_name = Some(String::from("dental-clinic-accounts"));
      Ok(Self {
        mongo_client: Client::with_options(options)?,
        database_name: config.database_name.clone(),
      })
    }

    pub fn database(&self) -> mongodb::Database {
      self.mongo_client.database(&self.database_name)
    }
  }

  impl Database for MongoDatabase {
    fn name(&self) -> &str {
      &self.database_name
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
      self.database().run_command(doc! { "ping": 1 }).await?;
      Ok(())
    }
  }

  /// Builds the client on the first ping that gets that far, so connection
  /// string resolution (SRV lookups for `mongodb+srv://`) is retried along
  /// with the ping itself.
  pub struct MongoConnector {
    config: Config,
    database: RefCell<Option<MongoDatabase>>,
  }

  impl MongoConnector {
    pub fn new(config: Config) -> Self {
      Self {
        config,
        database: RefCell::new(None),
      }
    }
  }

  impl Database for MongoConnector {
    fn name(&self) -> &str {
      &self.config.database_name
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
      let cached = self.database.borrow().clone();
      let database = match cached {
        Some(database) => database,
        None => {
          let database = MongoDatabase::new(&self.config).await?;
          *self.database.borrow_mut() = Some(database.clone());
          database
        }
      };
      database.ping().await
    }
  }

  #[cfg(test)]
  mod tests {
    use super::*;
    use crate::helpers::tests::test_config;

    #[actix_web::test]
    async fn test_connector_retries_client_construction() {
      let connector = MongoConnector::new(Config {
        database_url: String::from("not a connection string"),
        ..test_config()
      });

      assert!(connector.ping().await.is_err());
      assert!(connector.ping().await.is_err());
      assert!(connector.database.borrow().is_none());
      assert_eq!(connector.name(), "dental_clinic_test");
    }
  }
}
