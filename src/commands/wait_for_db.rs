//! Blocks until the database answers, so dependent services start only
//! once storage is reachable.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info};

use crate::shared::database::{Database, DatabaseError};

pub const MAX_ATTEMPTS: u32 = 60;
pub const RETRY_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum WaitForDbError {
  #[error("Database unavailable after {attempts} attempt(s): {last_error}")]
  Unavailable {
    attempts: u32,
    #[source]
    last_error: DatabaseError,
  },
  #[error("Failed to write command output: {0}")]
  Output(#[from] std::io::Error),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
  async fn sleep(&self, duration: Duration);
}

/// Sleeps on the actix runtime timer.
pub struct RuntimeSleeper;

#[async_trait]
impl Sleeper for RuntimeSleeper {
  async fn sleep(&self, duration: Duration) {
    actix_web::rt::time::sleep(duration).await;
  }
}

#[derive(Debug, Clone)]
pub struct Command {
  pub max_attempts: u32,
  pub interval: Duration,
}

impl Default for Command {
  fn default() -> Self {
    Self {
      max_attempts: MAX_ATTEMPTS,
      interval: RETRY_INTERVAL,
    }
  }
}

impl Command {
  /// Pings `database` until it answers, sleeping `interval` between
  /// failures. Every error counts as a failed attempt, since a server that
  /// is still starting can refuse credentials too. Returns the number of
  /// attempts it took.
  pub async fn handle<DB, S, W>(
    &self,
    database: &DB,
    sleeper: &S,
    stdout: &mut W,
  ) -> Result<u32, WaitForDbError>
  where
    DB: Database,
    S: Sleeper + ?Sized,
    W: Write,
  {
    let max_attempts = self.max_attempts.max(1);
    writeln!(stdout, "Waiting for database...")?;

    let mut attempt = 0;
    loop {
      attempt += 1;
      match database.ping().await {
        Ok(()) => {
          writeln!(stdout, "Database available after {} attempt(s)!", attempt)?;
          info!("Database {} available after {} attempt(s)", database.name(), attempt);
          return Ok(attempt);
        }
        Err(error) if attempt >= max_attempts => {
          return Err(WaitForDbError::Unavailable {
            attempts: attempt,
            last_error: error,
          });
        }
        Err(error) => {
          debug!("Ping attempt {} failed: {}", attempt, error);
          writeln!(
            stdout,
            "Database unavailable, waiting {} second(s)... (attempt {}/{})",
            self.interval.as_secs(),
            attempt,
            max_attempts
          )?;
          sleeper.sleep(self.interval).await;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use mockall::predicate::eq;

  use super::*;

  /// Fails the first `failures` pings, then answers.
  struct FlakyDatabase {
    failures: u32,
    attempts: Cell<u32>,
  }

  impl FlakyDatabase {
    fn new(failures: u32) -> Self {
      Self {
        failures,
        attempts: Cell::new(0),
      }
    }
  }

  impl Database for FlakyDatabase {
    fn name(&self) -> &str {
      "flaky"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
      let attempt = self.attempts.get() + 1;
      self.attempts.set(attempt);
      if attempt <= self.failures {
        let reason = if attempt <= 2 {
          "Connection refused"
        } else {
          "Database not ready"
        };
        return Err(DatabaseError::Unavailable(String::from(reason)));
      }
      Ok(())
    }
  }

  #[actix_web::test]
  async fn test_wait_for_db_ready() {
    let database = FlakyDatabase::new(0);
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep().never();
    let mut stdout = Vec::new();

    let attempts = Command::default()
      .handle(&database, &sleeper, &mut stdout)
      .await
      .unwrap();

    assert_eq!(attempts, 1);
    assert_eq!(database.attempts.get(), 1);
    let output = String::from_utf8(stdout).unwrap();
    assert!(output.contains("Database available after 1 attempt(s)!"));
  }

  #[actix_web::test]
  async fn test_wait_for_db_delay() {
    let database = FlakyDatabase::new(5);
    let mut sleeper = MockSleeper::new();
    sleeper
      .expect_sleep()
      .with(eq(Duration::from_secs(2)))
      .times(5)
      .return_const(());
    let mut stdout = Vec::new();

    let attempts = Command::default()
      .handle(&database, &sleeper, &mut stdout)
      .await
      .unwrap();

    assert_eq!(attempts, 6);
    assert_eq!(database.attempts.get(), 6);
    let output = String::from_utf8(stdout).unwrap();
    assert!(output.contains("(attempt 5/60)"));
    assert!(output.contains("Database available after 6 attempt(s)!"));
  }

  #[actix_web::test]
  async fn test_wait_for_db_gives_up_after_max_attempts() {
    let database = FlakyDatabase::new(u32::MAX);
    let mut sleeper = MockSleeper::new();
    sleeper
      .expect_sleep()
      .with(eq(RETRY_INTERVAL))
      .times(59)
      .return_const(());
    let mut stdout = Vec::new();

    let error = Command::default()
      .handle(&database, &sleeper, &mut stdout)
      .await
      .unwrap_err();

    assert!(matches!(
      error,
      WaitForDbError::Unavailable { attempts: 60, .. }
    ));
    assert_eq!(database.attempts.get(), MAX_ATTEMPTS);
    let output = String::from_utf8(stdout).unwrap();
    assert!(!output.contains("Database available"));
  }

  #[actix_web::test]
  async fn test_zero_attempts_still_tries_once() {
    let database = FlakyDatabase::new(1);
    let sleeper = MockSleeper::new();
    let command = Command {
      max_attempts: 0,
      interval: Duration::from_millis(1),
    };

    let error = command
      .handle(&database, &sleeper, &mut std::io::sink())
      .await
      .unwrap_err();

    assert!(matches!(
      error,
      WaitForDbError::Unavailable { attempts: 1, .. }
    ));
  }

  #[actix_web::test]
  async fn test_runtime_sleeper_sleeps() {
    let started = std::time::Instant::now();
    RuntimeSleeper.sleep(Duration::from_millis(20)).await;
    assert!(started.elapsed() >= Duration::from_millis(20));
  }
}
