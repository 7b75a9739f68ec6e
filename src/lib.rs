pub mod codec;
pub mod commands;
pub mod connection;
pub mod db;
pub mod frame;
pub mod persistence;
pub mod pubsub;
pub mod server;
pub mod store;
pub mod transaction;
pub mod version;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
