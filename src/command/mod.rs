pub mod export;
pub mod server;
