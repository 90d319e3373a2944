use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use orchestrator_engine::EngineConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub engine: EngineSection,
    #[serde(default)]
    pub definitions: DefinitionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    pub max_concurrent: usize,
    pub poll_interval_seconds: u64,
}

/// 作业定义批量加载配置，`dir` 为空时跳过加载
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    pub dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "orchestrator.db".to_string(),
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
            },
            engine: EngineSection {
                max_concurrent: 10,
                poll_interval_seconds: 1,
            },
            definitions: DefinitionsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.path", "orchestrator.db")?
            .set_default("api.bind_address", "0.0.0.0:8080")?
            .set_default("engine.max_concurrent", 10)?
            .set_default("engine.poll_interval_seconds", 1)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {path}"));
            }
        } else {
            let default_paths = ["config/orchestrator.toml", "orchestrator.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ORCHESTRATOR")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.is_empty() {
            return Err(anyhow::anyhow!("database.path 不能为空"));
        }
        if self.api.bind_address.is_empty() {
            return Err(anyhow::anyhow!("api.bind_address 不能为空"));
        }
        if self.engine.max_concurrent == 0 {
            return Err(anyhow::anyhow!("engine.max_concurrent 必须大于0"));
        }
        if self.engine.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!("engine.poll_interval_seconds 必须大于0"));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_concurrent: self.engine.max_concurrent,
            poll_interval: Duration::from_secs(self.engine.poll_interval_seconds),
        }
    }
}
