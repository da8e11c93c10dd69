pub mod admin;
pub mod auth;
pub mod chapters;
pub mod error;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod session;
