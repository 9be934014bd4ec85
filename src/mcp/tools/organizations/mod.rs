// Organizations module
pub mod get_current_user_details;

pub use get_current_user_details::get_current_user_details;
