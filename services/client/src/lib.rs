pub mod adapters;
pub mod config;
pub mod error;
pub mod upload;
pub mod views;
