pub mod master_key_middleware;
