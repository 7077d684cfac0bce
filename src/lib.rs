pub mod config;
pub mod middleware;
pub mod models;
pub mod redis;
pub mod routes;
pub mod services;
pub mod utils;

pub use config::Settings;
pub use redis::RedisPool;
