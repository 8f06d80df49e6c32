//! 文件令牌存储
//! 以 JSON 文件持久化，跨进程运行保留登录状态

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::TokenStore;
use crate::error::Result;

const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    schema: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            schema: STORE_SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    file: Mutex<StoreFile>,
}

impl FileTokenStore {
    /// 打开存储文件；文件不存在或内容损坏时视为空
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable token store");
                StoreFile::default()
            }),
            Err(_) => StoreFile::default(),
        };

        Self {
            path,
            file: Mutex::new(file),
        }
    }

    fn save(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        Ok(file.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.entries.insert(key.to_string(), value.to_string());
        self.save(&file)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if file.entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&file)
    }
}
