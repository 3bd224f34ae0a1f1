use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 每个查询最多缓存的结果数
pub const MAX_RESULTS: usize = 100;

/// 查询词最短长度，短于此长度不发起搜索
pub const MIN_QUERY_LEN: usize = 3;

/// 远程 API 请求超时
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// 虚拟文件系统的 URL scheme
pub const SCHEME: &str = "everything://";

/// "无内容可显示" 占位条目
pub const PLACEHOLDER: &str = "placeholder";

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:5000/everything-search-api/search";

/// 64 位进程无法加载 32 位 DLL，默认值随目标位宽变化
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_DLL_PATH: &str = "Everything64.dll";
#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_DLL_PATH: &str = "Everything32.dll";

const SETTINGS_FILE: &str = "settings.toml";
const LEGACY_SETTINGS_FILE: &str = "settings.json";

/// 程序所在目录，默认在此查找配置文件
pub static APP_DIR: once_cell::sync::Lazy<PathBuf> = once_cell::sync::Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[serde(alias = "dll")]
    Native,
    #[serde(alias = "api")]
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub mode: SearchMode,
    pub api_endpoint: String,
    /// DLL 文件名或路径，相对路径基于配置目录
    pub dll_path: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: SearchMode::Native,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            dll_path: DEFAULT_DLL_PATH.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    search: Option<SearchSection>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchSection {
    mode: Option<SearchMode>,
    api_endpoint: Option<String>,
    dll_path: Option<String>,
}

impl SearchSettings {
    /// 读取配置，任何错误都回退到默认值
    pub fn load(dir: &Path) -> Self {
        match Self::try_load(dir) {
            Ok(Some(settings)) => {
                tracing::info!("配置已加载: {:?}", settings);
                settings
            }
            Ok(None) => {
                tracing::info!("未找到配置文件 ({})，使用默认配置", dir.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("读取配置失败: {}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// settings.toml 优先；不存在时兼容旧版 settings.json
    pub fn try_load(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let primary = dir.join(SETTINGS_FILE);
        if primary.exists() {
            let text = read(&primary)?;
            let file: SettingsFile = toml::from_str(&text).map_err(|source| ConfigError::Toml {
                path: primary.clone(),
                source,
            })?;
            return Ok(Some(Self::from_file(file)));
        }

        let legacy = dir.join(LEGACY_SETTINGS_FILE);
        if legacy.exists() {
            let text = read(&legacy)?;
            let file: SettingsFile =
                serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                    path: legacy.clone(),
                    source,
                })?;
            return Ok(Some(Self::from_file(file)));
        }

        Ok(None)
    }

    fn from_file(file: SettingsFile) -> Self {
        let mut settings = Self::default();
        if let Some(section) = file.search {
            if let Some(mode) = section.mode {
                settings.mode = mode;
            }
            if let Some(endpoint) = section.api_endpoint {
                settings.api_endpoint = endpoint;
            }
            if let Some(dll) = section.dll_path {
                settings.dll_path = dll;
            }
        }
        settings
    }

    pub fn library_path(&self, base_dir: &Path) -> PathBuf {
        let p = PathBuf::from(&self.dll_path);
        if p.is_absolute() {
            p
        } else {
            base_dir.join(p)
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 配置目录候选：程序目录，其次用户配置目录
pub fn settings_dir() -> PathBuf {
    let app_dir = APP_DIR.clone();
    if app_dir.join(SETTINGS_FILE).exists() || app_dir.join(LEGACY_SETTINGS_FILE).exists() {
        return app_dir;
    }
    match dirs::config_dir() {
        Some(mut p) => {
            p.push("everything-fs");
            if p.exists() {
                p
            } else {
                app_dir
            }
        }
        None => app_dir,
    }
}

/// 日志文件路径 (系统临时目录)
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("everything_fs.log")
}
