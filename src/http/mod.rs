pub mod admin;
pub mod auth;
pub mod health;
pub mod players;
pub mod routes;
