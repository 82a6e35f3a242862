pub mod dto;
pub mod manager;
pub mod model;
pub mod repository;
