pub mod client;
pub mod organizations;
pub mod projects;
pub mod teams;
pub mod user_agent;
