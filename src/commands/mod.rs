pub mod wait_for_db;
