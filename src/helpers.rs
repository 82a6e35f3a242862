#[cfg(test)]
pub mod tests {
  use std::{net::SocketAddr, str::FromStr, sync::Arc};

  use actix_web::{http::header, test::TestRequest, web};

  use crate::{
    shared::{
      config::Config, database::InMemoryDatabase, hash_worker::HashWorker,
    },
    users::repository::user_repository::InMemoryUserRepository,
    AppState,
  };

  pub const MASTER_KEY: &str = "FAKE_MASTER_KEY";

  pub fn test_config() -> Config {
    Config {
      host: String::from("127.0.0.1:0"),
      master_key: String::from(MASTER_KEY),
      database_url: String::from("mongodb://localhost:27017"),
      database_name: String::from("dental_clinic_test"),
      hash_threads: 1,
      bcrypt_cost: 4,
      admin_requests_per_second: 1000,
      admin_burst_size: 1000,
    }
  }

  pub fn test_app_data() -> (
    web::Data<AppState<InMemoryUserRepository>>,
    web::Data<InMemoryDatabase>,
  ) {
    let config = test_config();
    let hasher = HashWorker::new(config.hash_threads, config.bcrypt_cost)
      .expect("Failed to create hash worker");
    let state = AppState {
      user_repository: InMemoryUserRepository::new(),
      config,
      hasher: Arc::new(hasher),
    };
    (web::Data::new(state), web::Data::new(InMemoryDatabase))
  }

  /// A request from a fixed peer, as the rate limiter keys on peer IP.
  pub fn anonymous_request(request: TestRequest) -> TestRequest {
    request.peer_addr(SocketAddr::from_str("127.0.0.1:12345").unwrap())
  }

  pub fn admin_request(request: TestRequest) -> TestRequest {
    anonymous_request(request).append_header((
      header::AUTHORIZATION,
      format!("Bearer {}", MASTER_KEY),
    ))
  }
}
