#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::CoreError;
#[cfg(not(target_arch = "wasm32"))]
use crate::models::settings::Settings;
use crate::models::user::AuthToken;

/// Persistent storage for the auth token (the browser's local storage, a file
/// on disk, or memory in tests). Exactly one token lives under one key.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<AuthToken>, CoreError>;
    fn save(&self, token: &AuthToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Keeps the token in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already "persisted", as after a previous run.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(AuthToken::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, CoreError> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), CoreError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Key/value JSON file on disk, like a tiny local storage (native only).
///
/// Other keys in the file are preserved; only `key` is ever touched.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileTokenStore {
    path: std::path::PathBuf,
    key: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileTokenStore {
    pub fn new(path: impl Into<std::path::PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Store under the key configured in `settings.token_key`.
    pub fn from_settings(path: impl Into<std::path::PathBuf>, settings: &Settings) -> Self {
        Self::new(path, settings.token_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                CoreError::Storage(format!(
                    "Corrupt token file {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| CoreError::Storage(format!("Failed to encode token file: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, CoreError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(&self.key)
            .filter(|t| !t.is_empty())
            .map(AuthToken::new))
    }

    fn save(&self, token: &AuthToken) -> Result<(), CoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(self.key.clone(), token.as_str().to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), CoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
