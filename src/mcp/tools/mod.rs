pub mod organizations;
pub mod projects;
pub mod support;
pub mod teams;
