pub mod user_change_rto;
pub mod user_list_rto;
