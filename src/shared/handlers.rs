use actix_web::{web, HttpResponse, Responder};

use super::database::Database;
use super::health_check::{self, HealthCheckStats};

#[utoipa::path(
  get,
  path = "/health",
  responses(
    (status = 200, description = "The database answers pings", body = HealthCheckStats),
    (status = 503, description = "The database is unreachable", body = HealthCheckStats)
  )
)]
pub async fn check_health<DB: Database>(
  database: web::Data<DB>,
) -> impl Responder {
  let stats = health_check::collect(database.get_ref()).await;
  if stats.is_healthy() {
    HttpResponse::Ok().json(stats)
  } else {
    HttpResponse::ServiceUnavailable().json(stats)
  }
}
