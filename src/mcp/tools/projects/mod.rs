pub mod list_projects;

pub use list_projects::{ListProjectsArgs, list_projects};
