// Support module for shared utility functions
mod non_empty_string;
mod projects_to_csv;
mod tool_error;

pub use non_empty_string::deserialize_non_empty_string;
pub use projects_to_csv::projects_to_csv;
pub use tool_error::tool_error;
