use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::database::Database;

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCheckStats {
  pub database_status: String,
  pub database_name: String,
}

impl HealthCheckStats {
  pub fn is_healthy(&self) -> bool {
    self.database_status == "connected"
  }
}

pub async fn collect<DB: Database>(database: &DB) -> HealthCheckStats {
  let database_status = match database.ping().await {
    Ok(()) => "connected",
    Err(error) => {
      warn!("Health check ping failed: {}", error);
      "unavailable"
    }
  };
  HealthCheckStats {
    database_status: String::from(database_status),
    database_name: database.name().to_string(),
  }
}
