pub mod add_user_dto;
pub mod change_user_dto;
