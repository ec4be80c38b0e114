//! 测试用的最小产物目录（本 crate 单测 + `test-fixtures` feature 给下游测试）
use crate::artifacts::{FEATURE_NAMES_FILE, MODEL_FILE, SCALER_FILE};
use crate::encode::dummy_name;
use crate::schema::NUMERIC_COLS;
use serde_json::json;
use std::fs;
use std::io;
use std::path::Path;

/// 9 个数值列（系数 0）+ 5 个 dummy 列
///
/// 样例记录：z = -1.0(intercept) - 0.5(month_may) = -1.5，P(yes) ≈ 0.18；
/// poutcome=success 时 z = 1.5，P(yes) ≈ 0.82
pub fn write_artifacts(dir: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = NUMERIC_COLS.iter().map(|s| s.to_string()).collect();
    for (col, v) in [
        ("job", "technician"),
        ("job", "student"),
        ("poutcome", "success"),
        ("month", "may"),
        ("contact", "cellular"),
    ] {
        names.push(dummy_name(col, v));
    }

    let mut coef = vec![0.0; names.len()];
    coef[NUMERIC_COLS.len() + 2] = 3.0;
    coef[NUMERIC_COLS.len() + 3] = -0.5;

    fs::write(dir.join(FEATURE_NAMES_FILE), json!(names).to_string())?;
    fs::write(
        dir.join(MODEL_FILE),
        json!({ "coef": coef, "intercept": -1.0, "classes": ["no", "yes"] }).to_string(),
    )?;
    fs::write(
        dir.join(SCALER_FILE),
        json!({
            "mean": [40.0, 2.5, 960.0, 0.2, 0.08, 93.5, -40.5, 3.6, 5167.0],
            "scale": [10.0, 2.7, 190.0, 0.5, 1.5, 0.6, 4.6, 1.7, 72.0],
            "feature_names_in": NUMERIC_COLS,
        })
        .to_string(),
    )?;
    Ok(names)
}
