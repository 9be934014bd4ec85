pub mod auth;
pub mod azure;
pub mod mcp;
pub mod server;
