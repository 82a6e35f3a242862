use actix_web::{dev::ServiceRequest, error, web, Error};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{users::repository::user_repository::UserRepository, AppState};

/// Accepts requests whose bearer token equals the configured master key.
pub async fn bearer_validator<UR: UserRepository + 'static>(
  request: ServiceRequest,
  credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let master_key = request
    .app_data::<web::Data<AppState<UR>>>()
    .map(|data| data.config.master_key.clone());
  let Some(master_key) = master_key else {
    return Err((
      error::ErrorInternalServerError("Application state missing"),
      request,
    ));
  };

  if bool::from(credentials.token().as_bytes().ct_eq(master_key.as_bytes())) {
    return Ok(request);
  }
  warn!(
    "Rejected admin request from {:?}",
    request.connection_info().realip_remote_addr()
  );
  Err((error::ErrorUnauthorized("Unauthorized"), request))
}
