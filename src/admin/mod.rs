//! Administration API over user accounts: changelist, change view, add and
//! change forms, deletion. Mounted under `/v1/admin/users` behind the
//! master-key bearer check.

pub mod dto;
pub mod rto;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use dto::add_user_dto::AddUserDto;
use dto::change_user_dto::ChangeUserDto;
use rto::user_change_rto::UserChangeRto;
use rto::user_list_rto::UserChangelistRto;
use tracing::error;

use crate::shared::http_error::HttpError;
use crate::shared::rto::created_rto::CreatedRto;
use crate::users::manager::AccountError;
use crate::users::repository::user_repository::UserRepository;
use crate::AppState;

#[utoipa::path(
  get,
  path = "/v1/admin/users",
  responses(
    (status = 200, description = "Users ordered by id", body = UserChangelistRto),
    (status = 401, description = "Missing or wrong master key")
  )
)]
pub async fn list_users<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
) -> impl Responder {
  match data.users().list().await {
    Ok(users) => {
      HttpResponse::Ok().json(UserChangelistRto::from(users.as_slice()))
    }
    Err(error) => account_error(error),
  }
}

#[utoipa::path(
  get,
  path = "/v1/admin/users/{id}",
  params(("id" = i64, Path, description = "User id")),
  responses(
    (status = 200, description = "Grouped user fields", body = UserChangeRto),
    (status = 404, description = "Unknown user", body = HttpError)
  )
)]
pub async fn get_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  id: web::Path<i64>,
) -> impl Responder {
  match data.users().get(id.into_inner()).await {
    Ok(user) => HttpResponse::Ok().json(UserChangeRto::from(&user)),
    Err(error) => account_error(error),
  }
}

#[utoipa::path(
  post,
  path = "/v1/admin/users",
  request_body = AddUserDto,
  responses(
    (status = 201, description = "User created", body = CreatedRto),
    (status = 400, description = "Validation errors"),
    (status = 409, description = "Uniqueness conflict", body = HttpError)
  )
)]
pub async fn add_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  dto: web::Json<AddUserDto>,
) -> impl Responder {
  let dto = dto.into_inner();
  if let Err(validation_errors) = dto.check_passwords() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  match data.users().create_user(dto.into()).await {
    Ok(user) => HttpResponse::Created()
      .content_type("application/json")
      .append_header((header::LOCATION, format!("/v1/admin/users/{}", user.id)))
      .json(CreatedRto { id: user.id }),
    Err(error) => account_error(error),
  }
}

#[utoipa::path(
  patch,
  path = "/v1/admin/users/{id}",
  params(("id" = i64, Path, description = "User id")),
  request_body = ChangeUserDto,
  responses(
    (status = 200, description = "Updated user", body = UserChangeRto),
    (status = 400, description = "Validation errors"),
    (status = 404, description = "Unknown user", body = HttpError),
    (status = 409, description = "Uniqueness conflict", body = HttpError)
  )
)]
pub async fn change_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  id: web::Path<i64>,
  dto: web::Json<ChangeUserDto>,
) -> impl Responder {
  let users = data.users();
  let mut user = match users.get(id.into_inner()).await {
    Ok(user) => user,
    Err(error) => return account_error(error),
  };
  dto.into_inner().apply(&mut user);

  match users.save(user).await {
    Ok(user) => HttpResponse::Ok().json(UserChangeRto::from(&user)),
    Err(error) => account_error(error),
  }
}

#[utoipa::path(
  delete,
  path = "/v1/admin/users/{id}",
  params(("id" = i64, Path, description = "User id")),
  responses(
    (status = 204, description = "User deleted"),
    (status = 404, description = "Unknown user", body = HttpError)
  )
)]
pub async fn delete_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  id: web::Path<i64>,
) -> impl Responder {
  match data.users().delete(id.into_inner()).await {
    Ok(()) => HttpResponse::NoContent().finish(),
    Err(error) => account_error(error),
  }
}

fn account_error(error: AccountError) -> HttpResponse {
  match error {
    AccountError::Validation(validation_errors) => {
      HttpResponse::BadRequest().json(validation_errors)
    }
    AccountError::MissingUsername
    | AccountError::MissingEmail
    | AccountError::SuperuserFlag(_) => {
      HttpResponse::BadRequest().json(HttpError::from(error.to_string()))
    }
    AccountError::NotFound => {
      HttpResponse::NotFound().json(HttpError::from("User not found"))
    }
    AccountError::Integrity(_) => {
      HttpResponse::Conflict().json(HttpError::from(error.to_string()))
    }
    AccountError::Repository(_) | AccountError::Hash(_) => {
      error!("{}", error);
      HttpResponse::InternalServerError().finish()
    }
  }
}
