pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod graphql;
pub mod mutation;
pub mod node;
pub mod server;
pub mod services;
