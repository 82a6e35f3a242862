use async_trait::async_trait;
use bcrypt::{hash, verify, BcryptError};
#[cfg(test)]
use mockall::automock;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashWorkerError {
  #[error("Bcrypt error: {0}")]
  Bcrypt(#[from] BcryptError),
  #[error("Thread pool error: {0}")]
  ThreadPool(#[from] ThreadPoolBuildError),
  #[error("Channel send error")]
  Send,
  #[error("Channel receive error")]
  Receive,
}

enum WorkOrder {
  Hash(String, flume::Sender<Result<String, HashWorkerError>>),
  Verify(String, String, flume::Sender<Result<bool, HashWorkerError>>),
}

/// Runs bcrypt on a dedicated rayon pool so hashing never blocks the
/// actix workers.
pub struct HashWorker {
  sender: flume::Sender<WorkOrder>,
  // Dropped after `sender`, once the run-loops have seen the channel close.
  _thread_pool: ThreadPool,
}

impl HashWorker {
  pub fn new(num_threads: u32, cost: u32) -> Result<Self, HashWorkerError> {
    let num_threads = num_threads.max(1);
    let thread_pool = ThreadPoolBuilder::new()
      .num_threads(num_threads as usize)
      .thread_name(|index| format!("hash-worker-{}", index))
      .build()?;

    // Each bcrypt round at the default cost takes a sizeable fraction of a
    // second, so allow about three rounds per thread to queue up.
    let channels_capacity = num_threads * 3;
    let (tx, rx) = flume::bounded::<WorkOrder>(channels_capacity as usize);
    let rx = Arc::new(rx);

    for _ in 0..num_threads {
      thread_pool.spawn({
        let arc_rx = Arc::clone(&rx);
        move || {
          while let Ok(work_order) = arc_rx.recv() {
            match work_order {
              WorkOrder::Hash(password, response) => {
                let _ = response
                  .send(hash(password, cost).map_err(HashWorkerError::from));
              }
              WorkOrder::Verify(password, hashed_password, response) => {
                let _ = response.send(
                  verify(password, &hashed_password)
                    .map_err(HashWorkerError::from),
                );
              }
            };
          }
        }
      });
    }

    Ok(Self {
      sender: tx,
      _thread_pool: thread_pool,
    })
  }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Hasher: Send + Sync {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError>;
  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError>;
}

#[async_trait]
impl Hasher for HashWorker {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Hash(password.to_string(), response_tx))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }

  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Verify(
        password.to_string(),
        hash.to_string(),
        response_tx,
      ))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }
}

/// Short description of a stored hash, safe to show in the admin.
pub fn describe_hash(password_hash: &str) -> String {
  let mut parts = password_hash.split('$').skip(1);
  match (parts.next(), parts.next()) {
    (Some(variant), Some(cost)) if variant.starts_with('2') => {
      format!("algorithm: bcrypt ${}$ cost: {}", variant, cost)
    }
    _ => String::from("No password set."),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fake::{faker::internet::en::Password, Fake};

  #[actix_web::test]
  async fn test_hash_and_verify_password() {
    let hash_worker = HashWorker::new(2, 4).expect("Failed to create worker");

    let password = Password(12..13).fake::<String>();

    let hashed_password = hash_worker
      .hash_password(&password)
      .await
      .expect("Hashing failed");
    assert_ne!(hashed_password, password);

    let is_valid = hash_worker
      .verify_password(&password, &hashed_password)
      .await
      .expect("Verification failed");
    assert!(is_valid, "The password verification failed");

    let is_invalid = hash_worker
      .verify_password("wrong_password", &hashed_password)
      .await
      .expect("Verification failed for invalid password");
    assert!(!is_invalid, "The password verification should have failed");
  }

  #[test]
  fn test_describe_hash() {
    let hashed = hash("secret", 4).unwrap();
    assert_eq!(describe_hash(&hashed), "algorithm: bcrypt $2b$ cost: 04");
    assert_eq!(describe_hash(""), "No password set.");
    assert_eq!(describe_hash("plain"), "No password set.");
  }
}
