use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpError {
  pub message: String,
}

impl From<&str> for HttpError {
  fn from(message: &str) -> Self {
    Self {
      message: message.to_string(),
    }
  }
}

impl From<String> for HttpError {
  fn from(message: String) -> Self {
    Self { message }
  }
}
