//! 渲染选项配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖和校验。
//! 渲染器在每帧开始前读取这些开关，决定是否执行粒子渲染。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 渲染选项
///
/// 渲染器消费的全局开关与标量参数。可从TOML/JSON文件加载，
/// 也可在运行时直接修改（下一帧生效）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// 本帧是否渲染粒子
    ///
    /// 关闭时渲染器直接跳过整个粒子遍历，池状态不受影响。
    pub particles_enabled: bool,

    /// 粒子最大绘制距离（世界单位）
    ///
    /// 超过该距离的粒子被剔除，不进入排序与提交。
    pub max_particle_distance: f32,

    /// 单个批次允许的最大四边形数
    ///
    /// 控制提交缓冲区的上限；超过时按序拆分成多个批次。
    pub max_batch_quads: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            particles_enabled: true,
            max_particle_distance: 1000.0,
            max_batch_quads: 4096,
        }
    }
}

impl RenderOptions {
    /// 创建默认选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("GFX_PARTICLES_ENABLED") {
            self.particles_enabled = val.parse().unwrap_or(self.particles_enabled);
        }
        if let Ok(val) = env::var("GFX_MAX_PARTICLE_DISTANCE") {
            if let Ok(distance) = val.parse() {
                self.max_particle_distance = distance;
            }
        }
        if let Ok(val) = env::var("GFX_MAX_BATCH_QUADS") {
            if let Ok(quads) = val.parse() {
                self.max_batch_quads = quads;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.max_particle_distance.is_finite() || self.max_particle_distance <= 0.0 {
            return Err(ConfigError::ValidationError(
                "max_particle_distance must be positive and finite".to_string(),
            ));
        }
        if self.max_batch_quads == 0 {
            return Err(ConfigError::ValidationError(
                "max_batch_quads must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        let options = RenderOptions::default();
        assert!(options.particles_enabled);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let options = RenderOptions {
            particles_enabled: false,
            max_particle_distance: 250.0,
            max_batch_quads: 512,
        };
        let toml = toml::to_string_pretty(&options).unwrap();
        let parsed = RenderOptions::from_toml_str(&toml).unwrap();
        assert!(!parsed.particles_enabled);
        assert_eq!(parsed.max_particle_distance, 250.0);
        assert_eq!(parsed.max_batch_quads, 512);
    }

    #[test]
    fn test_json_parse() {
        let parsed = RenderOptions::from_json_str(
            r#"{"particles_enabled": true, "max_particle_distance": 100.0, "max_batch_quads": 64}"#,
        )
        .unwrap();
        assert_eq!(parsed.max_particle_distance, 100.0);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.toml");

        let options = RenderOptions {
            particles_enabled: false,
            max_particle_distance: 300.0,
            max_batch_quads: 128,
        };
        options.save_toml(&path).unwrap();

        let loaded = RenderOptions::from_toml_file(&path).unwrap();
        assert!(!loaded.particles_enabled);
        assert_eq!(loaded.max_particle_distance, 300.0);
        assert_eq!(loaded.max_batch_quads, 128);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = RenderOptions::from_toml_file("no/such/render.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    // 环境变量是进程级状态，合并在一个测试里串行执行
    #[test]
    fn test_env_overrides() {
        let mut options = RenderOptions::default();
        env::set_var("GFX_PARTICLES_ENABLED", "false");
        env::set_var("GFX_MAX_PARTICLE_DISTANCE", "123.5");
        env::set_var("GFX_MAX_BATCH_QUADS", "256");
        options.apply_env_overrides();

        assert!(!options.particles_enabled);
        assert_eq!(options.max_particle_distance, 123.5);
        assert_eq!(options.max_batch_quads, 256);

        // 解析失败的值被忽略，保留当前值
        env::set_var("GFX_MAX_PARTICLE_DISTANCE", "not-a-number");
        options.apply_env_overrides();
        assert_eq!(options.max_particle_distance, 123.5);

        env::remove_var("GFX_PARTICLES_ENABLED");
        env::remove_var("GFX_MAX_PARTICLE_DISTANCE");
        env::remove_var("GFX_MAX_BATCH_QUADS");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut options = RenderOptions::default();
        options.max_particle_distance = -1.0;
        assert!(options.validate().is_err());

        let mut options = RenderOptions::default();
        options.max_batch_quads = 0;
        assert!(options.validate().is_err());
    }
}
