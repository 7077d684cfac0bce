pub mod audio;
pub mod error;
pub mod http_client;
pub mod language;
pub mod logger;

pub use error::{AppError, Result};
pub use http_client::HttpClient;
pub use logger::init_logger;
