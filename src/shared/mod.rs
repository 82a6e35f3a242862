pub mod config;
pub mod cuit;
pub mod database;
pub mod handlers;
pub mod hash_worker;
pub mod health_check;
pub mod http_error;
pub mod logging;
pub mod middleware;
pub mod role;
pub mod rto;
