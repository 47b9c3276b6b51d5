pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod input;
pub mod intake;
pub mod render;
