use crate::util::sigmoid;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

fn default_classes() -> [String; 2] {
    ["no".to_string(), "yes".to_string()]
}

#[inline]
fn clamp01(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// 二分类 LR：只保留推理需要的 coef_ / intercept_ / classes_
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
    /// [负类, 正类]，顺序与 predict_proba 的输出一致
    #[serde(default = "default_classes")]
    pub classes: [String; 2],
}

impl LogisticModel {
    pub fn decision_function(&self, row: &[f64]) -> Result<f64> {
        ensure!(
            row.len() == self.coef.len(),
            "feature row len mismatch: got={} expect={}",
            row.len(),
            self.coef.len()
        );
        let dot: f64 = self.coef.iter().zip(row).map(|(w, x)| w * x).sum();
        Ok(self.intercept + dot)
    }

    /// 返回 [P(负类), P(正类)]
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2]> {
        let p1 = clamp01(sigmoid(self.decision_function(row)?));
        Ok([1.0 - p1, p1])
    }
}
