pub mod chat;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod output;
pub mod portal;
pub mod retrieval;
pub mod table;
pub mod transport;
pub mod views;
