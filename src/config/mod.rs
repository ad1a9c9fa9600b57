pub mod settings;

pub use settings::{get_config, AiConfig, CoachConfig, StoreConfig};
