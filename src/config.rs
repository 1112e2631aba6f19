use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub plan: PlanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// 待ち受けアドレス
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// ランドマークを描画・判定に使う可視性の下限
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlanConfig {
    /// 週間プランの種類 ("beginner" / "strength" / "split")
    #[serde(default = "default_plan_profile")]
    pub profile: String,
}

fn default_bind_addr() -> String { "0.0.0.0:9100".to_string() }
fn default_visibility_threshold() -> f32 { 0.5 }
fn default_plan_profile() -> String { "beginner".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            profile: default_plan_profile(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 読めなければ既定値で続行する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }
}
