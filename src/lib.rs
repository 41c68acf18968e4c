pub mod api;
pub mod auth;
pub mod config;
pub mod crawler;
pub mod db;
pub mod error;
pub mod models;
pub mod progress;
pub mod state;
