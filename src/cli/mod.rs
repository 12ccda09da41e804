pub mod ask;
pub mod config;
pub mod knowledge;
pub mod shell;
