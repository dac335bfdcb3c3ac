pub mod config;
pub mod db;
pub mod error;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod workflow;
