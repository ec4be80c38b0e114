use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// 导出的标准化参数（与训练时 StandardScaler 的 mean_ / scale_ 对应）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// 可选：训练时的输入列名，用于加载时核对列顺序
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// (x - mean) / scale；scale 为 0 的常量列按 1 处理
    pub fn transform(&self, xs: &[f64]) -> Result<Vec<f64>> {
        ensure!(
            xs.len() == self.mean.len(),
            "scaler input width mismatch: got={} expect={}",
            xs.len(),
            self.mean.len()
        );
        Ok(xs
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }
}
