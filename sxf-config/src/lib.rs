use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "SXF_CONFIG";

/// 实例编号起始值与步长的上限，保证编号在任何实际图面规模下都不会溢出。
pub const MAX_INSTANCE_SETTING: u64 = u32::MAX as u64;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `SXF_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };
        let output = &self.output;
        if output.instance_step == 0 {
            return Err(invalid("output.instance_step 必须大于 0".to_string()));
        }
        if output.instance_base > MAX_INSTANCE_SETTING {
            return Err(invalid(format!(
                "output.instance_base 不能超过 {MAX_INSTANCE_SETTING}"
            )));
        }
        if output.instance_step > MAX_INSTANCE_SETTING {
            return Err(invalid(format!(
                "output.instance_step 不能超过 {MAX_INSTANCE_SETTING}"
            )));
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 输出文件的实例编号与头部字段。
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_instance_base")]
    pub instance_base: u64,
    #[serde(default = "OutputConfig::default_instance_step")]
    pub instance_step: u64,
    #[serde(default = "OutputConfig::default_author")]
    pub author: String,
    #[serde(default = "OutputConfig::default_organization")]
    pub organization: String,
    #[serde(default = "OutputConfig::default_translator")]
    pub translator: String,
}

impl OutputConfig {
    fn default_instance_base() -> u64 {
        10
    }

    fn default_instance_step() -> u64 {
        10
    }

    fn default_author() -> String {
        "author".to_string()
    }

    fn default_organization() -> String {
        "organization".to_string()
    }

    fn default_translator() -> String {
        "translator".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            instance_base: Self::default_instance_base(),
            instance_step: Self::default_instance_step(),
            author: Self::default_author(),
            organization: Self::default_organization(),
            translator: Self::default_translator(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置文件 {path:?} 无效: {message}")]
    Invalid { path: PathBuf, message: String },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
