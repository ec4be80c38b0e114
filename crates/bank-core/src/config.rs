use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 运行时配置：由 CLI 参数构造。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 模型产物目录（model.json / scaler.json / feature_names.json ...）
    pub model_dir: PathBuf,

    /// 覆盖 policy.json 里的判定阈值；None 表示沿用产物里的配置
    pub threshold_override: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            threshold_override: None,
        }
    }
}

impl Config {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold_override = threshold;
        self
    }
}
