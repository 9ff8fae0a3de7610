pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod routes;
pub mod seed;
