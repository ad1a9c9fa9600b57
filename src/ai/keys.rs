/// Ordered pool of API keys with a rotating cursor.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyManager {
    keys: Vec<String>,
    current: usize,
}

impl ApiKeyManager {
    /// `env_key` goes first unless it is already one of the configured keys.
    /// Blank keys are ignored.
    pub fn new(configured: &[String], env_key: Option<String>) -> Self {
        let mut keys: Vec<String> = configured
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if let Some(env_key) = env_key.map(|k| k.trim().to_string()) {
            if !env_key.is_empty() && !keys.contains(&env_key) {
                keys.insert(0, env_key);
            }
        }
        ApiKeyManager { keys, current: 0 }
    }

    /// Keys from the loaded config plus `GEMINI_API_KEY`
    pub fn from_config(config: &crate::config::AiConfig) -> Self {
        let env_key = std::env::var(crate::config::settings::API_KEY_ENV).ok();
        Self::new(&config.api_keys, env_key)
    }

    pub fn current(&self) -> Option<&str> {
        self.keys.get(self.current).map(String::as_str)
    }

    /// Move to the next key. Does nothing and returns None with fewer than two keys.
    pub fn rotate(&mut self) -> Option<&str> {
        if self.keys.len() <= 1 {
            return None;
        }
        self.current = (self.current + 1) % self.keys.len();
        self.current()
    }

    pub fn has_multiple(&self) -> bool {
        self.keys.len() > 1
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
