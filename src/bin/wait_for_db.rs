//! Waits until the configured database answers. Exits non-zero once every
//! attempt has failed.

use std::process::ExitCode;

use dental_clinic_accounts::{
  commands::wait_for_db::{Command, RuntimeSleeper},
  shared::logging::init_tracing,
};

#[actix_web::main]
async fn main() -> ExitCode {
  init_tracing();

  // The client is built inside each attempt, so a connection string that
  // cannot be resolved yet is retried like a refused ping.
  #[cfg(feature = "mongodb")]
  let database = {
    use dental_clinic_accounts::shared::{
      config::Config, database::MongoConnector,
    };

    MongoConnector::new(Config::from_env())
  };

  #[cfg(not(feature = "mongodb"))]
  let database = dental_clinic_accounts::shared::database::InMemoryDatabase;

  let mut stdout = std::io::stdout();
  match Command::default()
    .handle(&database, &RuntimeSleeper, &mut stdout)
    .await
  {
    Ok(_) => ExitCode::SUCCESS,
    Err(error) => {
      eprintln!("{}", error);
      ExitCode::FAILURE
    }
  }
}
