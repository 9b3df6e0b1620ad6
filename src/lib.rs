#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "A multi-tenant todo list service: accounts with bearer-token authentication,"]
#![doc = "and per-owner tasks behind a storage trait with Postgres and in-memory backends."]
#![doc = "The binary (`main.rs`) wires configuration, storage and services into an actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::error::AppError;
pub use crate::services::AppServices;
