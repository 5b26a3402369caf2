pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod interactive;
pub mod qr;
pub mod runtime;
pub mod store;
