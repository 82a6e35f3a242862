use std::{io, sync::Arc};

use actix_web::{web, App, HttpServer};
use tracing::info;

use dental_clinic_accounts::{
  configure,
  shared::{
    config::Config, database::Database, hash_worker::HashWorker,
    logging::init_tracing,
  },
  users::repository::user_repository::UserRepository,
  AppState,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
  init_tracing();
  let config = Config::from_env();
  let hasher = HashWorker::new(config.hash_threads, config.bcrypt_cost)
    .map_err(io::Error::other)?;

  #[cfg(feature = "mongodb")]
  let (user_repository, database) = {
    use dental_clinic_accounts::shared::database::MongoDatabase;
    use dental_clinic_accounts::users::repository::user_repository::MongoUserRepository;

    let database = MongoDatabase::new(&config)
      .await
      .map_err(io::Error::other)?;
    let user_repository = MongoUserRepository::new(database.clone());
    user_repository
      .ensure_indexes()
      .await
      .map_err(io::Error::other)?;
    (user_repository, database)
  };

  #[cfg(not(feature = "mongodb"))]
  let (user_repository, database) = {
    use dental_clinic_accounts::shared::database::InMemoryDatabase;
    use dental_clinic_accounts::users::repository::user_repository::InMemoryUserRepository;

    tracing::warn!("Built without a database backend, accounts live in memory");
    (InMemoryUserRepository::new(), InMemoryDatabase)
  };

  serve(config, user_repository, database, Arc::new(hasher)).await
}

async fn serve<UR, DB>(
  config: Config,
  user_repository: UR,
  database: DB,
  hasher: Arc<HashWorker>,
) -> io::Result<()>
where
  UR: UserRepository + Send + Sync + 'static,
  DB: Database + Send + Sync + 'static,
{
  let server_address = config.host.clone();
  let state = web::Data::new(AppState {
    user_repository,
    config,
    hasher,
  });
  let database = web::Data::new(database);

  info!("Listening on http://{}", server_address);
  HttpServer::new(move || {
    App::new().configure(configure(state.clone(), database.clone()))
  })
  .bind(server_address)?
  .run()
  .await
}
