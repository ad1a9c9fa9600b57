pub mod client;
pub mod generator;
pub mod json;
pub mod keys;
pub mod sanitize;

pub use client::{GeminiBackend, GenerationRequest, GenerativeBackend};
pub use generator::{AiGenerator, GenerationTask};
pub use keys::ApiKeyManager;
pub use sanitize::sanitize_workout_plan;
