use crate::scaler::StandardScaler;
use crate::schema::{Record, TimingsUs, CATEGORICAL_COLS, NUMERIC_COLS};
use crate::util::now_us;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::time::Instant;

/// dummy 列名：`{col}_{value}`（与训练时 get_dummies 的命名一致）
pub fn dummy_name(col: &str, value: &str) -> String {
    format!("{col}_{value}")
}

/// 对类别列做 one-hot：每列只产出当前取值那一个 1.0
pub fn one_hot(record: &Record) -> Vec<(String, f64)> {
    CATEGORICAL_COLS
        .iter()
        .filter_map(|col| {
            let v = record.get(col)?.as_category()?;
            Some((dummy_name(col, v), 1.0))
        })
        .collect()
}

/// 按给定列顺序取值，缺失列填 0
pub fn reindex(pairs: &[(String, f64)], columns: &[String]) -> Vec<f64> {
    let by_name: HashMap<&str, f64> = pairs.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    columns
        .iter()
        .map(|c| by_name.get(c.as_str()).copied().unwrap_or(0.0))
        .collect()
}

/// 按 NUMERIC_COLS 顺序取数值列
pub fn numeric_values(record: &Record) -> Result<Vec<f64>> {
    NUMERIC_COLS
        .iter()
        .map(|col| {
            record
                .get(col)
                .and_then(|v| v.as_number())
                .ok_or_else(|| anyhow!("numeric column `{col}` is missing or not a number"))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BuiltRow {
    pub row: Vec<f64>,
    /// 从样例记录补齐的列数
    pub filled: usize,
}

/// 训练时的特征布局：前 n_numeric 列是数值列，其余是 dummy 列
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    feature_order: Vec<String>,
    dummy_cols: Vec<String>,
}

impl FeatureLayout {
    pub fn new(feature_order: Vec<String>) -> Self {
        let dummy_cols = feature_order
            .iter()
            .skip(NUMERIC_COLS.len())
            .cloned()
            .collect();
        Self {
            feature_order,
            dummy_cols,
        }
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn width(&self) -> usize {
        self.feature_order.len()
    }

    /// 前 n_numeric 个名字是否就是 NUMERIC_COLS
    pub fn numeric_prefix_matches(&self) -> bool {
        self.feature_order
            .iter()
            .take(NUMERIC_COLS.len())
            .map(String::as_str)
            .eq(NUMERIC_COLS.iter().copied())
    }

    /// one-hot 后对齐到训练时的 dummy 列
    pub fn encode_categorical(&self, record: &Record) -> Vec<f64> {
        reindex(&one_hot(record), &self.dummy_cols)
    }

    /// 数值列在前、dummy 列在后拼接，再按 feature_order 按名重排（缺失填 0）
    pub fn assemble(&self, scaled_numeric: &[f64], dummies: &[f64]) -> Vec<f64> {
        let mut combined: Vec<(String, f64)> =
            Vec::with_capacity(scaled_numeric.len() + dummies.len());
        combined.extend(
            NUMERIC_COLS
                .iter()
                .map(|c| c.to_string())
                .zip(scaled_numeric.iter().copied()),
        );
        combined.extend(self.dummy_cols.iter().cloned().zip(dummies.iter().copied()));

        // 同名列取第一次出现的值
        let mut by_name: HashMap<&str, f64> = HashMap::with_capacity(combined.len());
        for (k, v) in &combined {
            by_name.entry(k.as_str()).or_insert(*v);
        }
        self.feature_order
            .iter()
            .map(|c| by_name.get(c.as_str()).copied().unwrap_or(0.0))
            .collect()
    }

    /// 完整的单行构造：补列 -> one-hot -> 对齐 -> 标准化 -> 拼接重排，各阶段耗时写入 `timings`
    pub fn build_row_timed(
        &self,
        record: &Record,
        scaler: &StandardScaler,
        timings: &mut TimingsUs,
    ) -> Result<BuiltRow> {
        let t_fill = Instant::now();
        let mut record = record.clone();
        let filled = record.fill_missing();
        timings.fill = now_us(t_fill);

        let t_enc = Instant::now();
        let dummies = self.encode_categorical(&record);
        timings.encode = now_us(t_enc);

        let t_scale = Instant::now();
        let scaled = scaler.transform(&numeric_values(&record)?)?;
        timings.scale = now_us(t_scale);

        let t_asm = Instant::now();
        let row = self.assemble(&scaled, &dummies);
        timings.assemble = now_us(t_asm);

        Ok(BuiltRow { row, filled })
    }

    /// 不计时版本
    pub fn build_row(&self, record: &Record, scaler: &StandardScaler) -> Result<Vec<f64>> {
        Ok(self
            .build_row_timed(record, scaler, &mut TimingsUs::default())?
            .row)
    }
}
