pub mod admin;
pub mod commands;
pub mod shared;
pub mod users;

#[cfg(test)]
mod helpers;

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use shared::{
  config::Config, database::Database, handlers::check_health,
  hash_worker::Hasher, middleware::master_key_middleware::bearer_validator,
};
use users::{manager::UserManager, repository::user_repository::UserRepository};

// This struct represents state
pub struct AppState<UR: UserRepository> {
  pub user_repository: UR,
  pub config: Config,
  pub hasher: Arc<dyn Hasher>,
}

impl<UR: UserRepository> AppState<UR> {
  pub fn users(&self) -> UserManager<'_, UR> {
    UserManager::new(&self.user_repository, self.hasher.as_ref())
  }
}

#[derive(OpenApi)]
#[openapi(
  info(title = "Dental clinic accounts"),
  paths(
    shared::handlers::check_health,
    admin::list_users,
    admin::get_user,
    admin::add_user,
    admin::change_user,
    admin::delete_user
  )
)]
pub struct ApiDoc;

/// Registers state, the health probe, the API reference and the admin
/// routes.
pub fn configure<UR, DB>(
  state: web::Data<AppState<UR>>,
  database: web::Data<DB>,
) -> impl FnOnce(&mut web::ServiceConfig)
where
  UR: UserRepository + 'static,
  DB: Database + 'static,
{
  move |config| {
    // Throttles master key guessing per peer IP. Both values are clamped
    // to at least 1, which is all `finish` checks.
    let governor_config = GovernorConfigBuilder::default()
      .requests_per_second(state.config.admin_requests_per_second.max(1))
      .burst_size(state.config.admin_burst_size.max(1))
      .finish()
      .expect("admin rate limit is non-zero");

    config
      .app_data(state)
      .app_data(database)
      .route("/health", web::get().to(check_health::<DB>))
      .service(Scalar::with_url("/scalar", ApiDoc::openapi()))
      .service(
        web::scope("/v1/admin")
          .wrap(HttpAuthentication::bearer(bearer_validator::<UR>))
          .wrap(Governor::new(&governor_config))
          .service(
            web::scope("/users")
              .route("", web::get().to(admin::list_users::<UR>))
              .route("", web::post().to(admin::add_user::<UR>))
              .route("/{id}", web::get().to(admin::get_user::<UR>))
              .route("/{id}", web::patch().to(admin::change_user::<UR>))
              .route("/{id}", web::delete().to(admin::delete_user::<UR>)),
          ),
      );
  }
}
