use crate::{
    artifacts::Artifacts,
    config::Config,
    input::{resolve_json, Resolved},
    schema::{Categories, Prediction, Record, TimingsUs, FIELDS},
    util::now_us,
};

use anyhow::{ensure, Context, Result};
use serde_json::{Map, Value};
use std::time::Instant;
use uuid::Uuid;

/// 单条记录的推理入口：产物 + 阈值
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: Artifacts,
    threshold: f64,
}

impl Predictor {
    pub fn new(artifacts: Artifacts, cfg: &Config) -> Result<Self> {
        let threshold = cfg
            .threshold_override
            .unwrap_or(artifacts.policy.threshold);
        ensure!(
            (0.0..=1.0).contains(&threshold),
            "threshold {threshold} out of [0, 1]"
        );
        Ok(Self {
            artifacts,
            threshold,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let artifacts = Artifacts::load_from_dir(&cfg.model_dir)
            .with_context(|| format!("load artifacts from {}", cfg.model_dir.display()))?;
        Self::new(artifacts, cfg)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn categories(&self) -> &Categories {
        &self.artifacts.categories
    }

    pub fn predict(&self, record: &Record) -> Result<Prediction> {
        let t0 = Instant::now();
        let trace_id = Uuid::new_v4();
        let mut timings = TimingsUs::default();
        let a = &self.artifacts;

        // 补列 + one-hot + 标准化 + 按 feature_order 拼接
        let built = a.layout.build_row_timed(record, &a.scaler, &mut timings)?;
        let filled = built.filled;
        if filled > 0 {
            metrics::counter!("predict_filled_columns_total").increment(filled as u64);
        }
        metrics::histogram!("stage_fill_us").record(timings.fill as f64);
        metrics::histogram!("stage_encode_us").record(timings.encode as f64);
        metrics::histogram!("stage_scale_us").record(timings.scale as f64);
        metrics::histogram!("stage_assemble_us").record(timings.assemble as f64);

        // LR
        let t_pred = Instant::now();
        let [p0, p1] = a.model.predict_proba(&built.row)?;
        timings.predict = now_us(t_pred);
        metrics::histogram!("stage_predict_us").record(timings.predict as f64);

        let [neg, pos] = &a.model.classes;
        let label = if p1 > self.threshold { pos } else { neg }.clone();
        metrics::counter!("predictions_total", "label" => label.clone()).increment(1);
        metrics::histogram!("e2e_us").record(now_us(t0) as f64);

        tracing::debug!(
            %trace_id,
            proba_positive = p1,
            label = %label,
            filled,
            "prediction"
        );

        Ok(Prediction {
            trace_id,
            negative_label: neg.clone(),
            positive_label: pos.clone(),
            proba_negative: p0,
            proba_positive: p1,
            label,
            timings_us: timings,
        })
    }

    /// JSON object -> Record：逐字段校验，非法值回退默认并告警，未知字段忽略
    pub fn record_from_json(&self, obj: &Map<String, Value>) -> Record {
        let mut record = Record::new();
        for spec in &FIELDS {
            let Some(v) = obj.get(spec.name) else {
                continue;
            };
            let Resolved { value, fallback } = resolve_json(spec, v, self.categories());
            if let Some(e) = fallback {
                tracing::warn!(field = spec.name, default = %value, "invalid input ({e}), using default");
                metrics::counter!("input_defaulted_total").increment(1);
            }
            record.set(spec.name, value);
        }
        for k in obj.keys() {
            if !FIELDS.iter().any(|f| f.name == k) {
                tracing::warn!(field = %k, "ignoring unknown field");
            }
        }
        record
    }
}
