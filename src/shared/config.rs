use std::{env, str::FromStr};

use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
  pub host: String,
  pub master_key: String,
  pub database_url: String,
  pub database_name: String,
  pub hash_threads: u32,
  pub bcrypt_cost: u32,
  pub admin_requests_per_second: u64,
  pub admin_burst_size: u32,
}

impl Config {
  pub fn from_env() -> Self {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let master_key =
      env::var("MASTER_KEY").unwrap_or_else(|_| "DEV_MASTER_KEY".to_string());
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let database_name =
      env::var("DATABASE_NAME").unwrap_or_else(|_| "dental_clinic".to_string());
    Self {
      host,
      master_key,
      database_url,
      database_name,
      hash_threads: parse_var("HASH_THREADS", 4),
      bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST),
      admin_requests_per_second: parse_var("ADMIN_REQUESTS_PER_SECOND", 2),
      admin_burst_size: parse_var("ADMIN_BURST_SIZE", 5),
    }
  }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
  match env::var(key) {
    Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
      warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
      default
    }),
    Err(_) => default,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_var_falls_back_on_garbage() {
    env::set_var("DENTAL_TEST_HASH_THREADS", "many");
    assert_eq!(parse_var("DENTAL_TEST_HASH_THREADS", 4u32), 4);
    env::set_var("DENTAL_TEST_HASH_THREADS", " 8 ");
    assert_eq!(parse_var("DENTAL_TEST_HASH_THREADS", 4u32), 8);
    env::remove_var("DENTAL_TEST_HASH_THREADS");
    assert_eq!(parse_var("DENTAL_TEST_HASH_THREADS", 4u32), 4);
  }
}
