pub mod arguments;
pub mod chat;
pub mod config;
pub mod errors; // Gateway error types and their HTTP mapping
pub mod logger;
pub mod runner;
pub mod webserver;
