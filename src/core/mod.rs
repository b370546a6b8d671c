pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{Result, SortieError};
pub use rng::MissionRng;
