use crate::encode::FeatureLayout;
use crate::model::LogisticModel;
use crate::scaler::StandardScaler;
use crate::schema::{Categories, NUMERIC_COLS};
use anyhow::{anyhow, ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const FEATURES_TXT_FILE: &str = "features.txt";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const POLICY_FILE: &str = "policy.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Policy {
    /// P(正类) 严格大于该值才判为正类
    pub threshold: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// 读取 JSON 产物：优先 `name`，其次 `name.gz`；都不存在返回 None
fn read_json_opt<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Option<T>> {
    let plain = dir.join(name);
    if plain.exists() {
        let s = fs::read_to_string(&plain)
            .with_context(|| format!("read {name}: {}", plain.display()))?;
        let v = serde_json::from_str(&s)
            .with_context(|| format!("parse {name}: {}", plain.display()))?;
        return Ok(Some(v));
    }

    let gz = dir.join(format!("{name}.gz"));
    if gz.exists() {
        let f = fs::File::open(&gz).with_context(|| format!("open {name}.gz: {}", gz.display()))?;
        let dec = flate2::read::GzDecoder::new(f);
        let v = serde_json::from_reader(dec)
            .with_context(|| format!("parse {name}.gz: {}", gz.display()))?;
        return Ok(Some(v));
    }

    Ok(None)
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    read_json_opt(dir, name)?.ok_or_else(|| {
        anyhow!(
            "missing {name} in model_dir={} (also tried {name}.gz)",
            dir.display()
        )
    })
}

fn load_feature_names(dir: &Path) -> Result<Vec<String>> {
    if let Some(names) = read_json_opt::<Vec<String>>(dir, FEATURE_NAMES_FILE)? {
        return Ok(names);
    }

    let txt_path = dir.join(FEATURES_TXT_FILE);
    if txt_path.exists() {
        let s = fs::read_to_string(&txt_path)
            .with_context(|| format!("read {FEATURES_TXT_FILE}: {}", txt_path.display()))?;
        return Ok(s
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect());
    }

    Err(anyhow!(
        "missing feature order in model_dir={}, expected {FEATURE_NAMES_FILE} or {FEATURES_TXT_FILE}",
        dir.display()
    ))
}

fn validate_feature_names(names: &[String]) -> Result<()> {
    ensure!(!names.is_empty(), "feature order is empty");
    let mut seen = HashSet::with_capacity(names.len());
    for n in names {
        ensure!(seen.insert(n.as_str()), "duplicate feature name in feature order: {n}");
    }
    Ok(())
}

fn validate_scaler(scaler: &StandardScaler) -> Result<()> {
    ensure!(
        scaler.mean.len() == NUMERIC_COLS.len() && scaler.scale.len() == NUMERIC_COLS.len(),
        "{SCALER_FILE}: expected {} columns, got mean={} scale={}",
        NUMERIC_COLS.len(),
        scaler.mean.len(),
        scaler.scale.len()
    );
    if let Some(names) = &scaler.feature_names_in {
        ensure!(
            names.iter().map(String::as_str).eq(NUMERIC_COLS.iter().copied()),
            "{SCALER_FILE}: feature_names_in {:?} does not match numeric columns {:?}",
            names,
            NUMERIC_COLS
        );
    }
    Ok(())
}

/// 推理所需的全部产物（加载时已做形状校验）
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model_dir: PathBuf,
    pub model: LogisticModel,
    pub scaler: StandardScaler,
    pub layout: FeatureLayout,
    pub categories: Categories,
    pub policy: Policy,
}

impl Artifacts {
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        ensure!(dir.is_dir(), "model_dir is not a directory: {}", dir.display());

        let feature_names = load_feature_names(dir)?;
        validate_feature_names(&feature_names)
            .with_context(|| format!("invalid feature order in {}", dir.display()))?;

        let model: LogisticModel = read_json(dir, MODEL_FILE)?;
        ensure!(
            model.coef.len() == feature_names.len(),
            "{MODEL_FILE}: coef len={} but feature order has {} names",
            model.coef.len(),
            feature_names.len()
        );

        let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;
        validate_scaler(&scaler)?;

        let categories = match read_json_opt::<Categories>(dir, CATEGORIES_FILE)? {
            Some(overrides) => Categories::builtin().merged_with(overrides),
            None => Categories::builtin(),
        };

        let policy: Policy = read_json_opt(dir, POLICY_FILE)?.unwrap_or_default();
        ensure!(
            (0.0..=1.0).contains(&policy.threshold),
            "{POLICY_FILE}: threshold {} out of [0, 1]",
            policy.threshold
        );

        let layout = FeatureLayout::new(feature_names);
        if !layout.numeric_prefix_matches() {
            tracing::warn!(
                model_dir = %dir.display(),
                "feature order does not start with the numeric columns; aligning by name"
            );
        }

        tracing::info!(
            model_dir = %dir.display(),
            n_features = layout.width(),
            threshold = policy.threshold,
            "artifacts loaded"
        );

        Ok(Self {
            model_dir: dir.to_path_buf(),
            model,
            scaler,
            layout,
            categories,
            policy,
        })
    }
}
