// Teams module
pub mod list_project_teams;

pub use list_project_teams::{ListProjectTeamsArgs, list_project_teams};
