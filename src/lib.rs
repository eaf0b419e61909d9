pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod position;
pub mod process;
pub mod write;

pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use position::PositionCode;
