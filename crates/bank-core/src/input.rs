use crate::schema::{Categories, FieldKind, FieldSpec, FieldValue};
use serde_json::Value;
use thiserror::Error;

/// 单个字段的输入校验失败原因（不致命：调用方回退到默认值）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("empty input")]
    Empty,

    #[error("`{0}` is not a finite number")]
    NotNumeric(String),

    #[error("`{value}` is not one of the valid options for {field}")]
    UnknownCategory { field: String, value: String },

    #[error("unsupported JSON value for {field}: {kind}")]
    UnsupportedJson { field: String, kind: &'static str },
}

/// 校验后的字段值；`fallback` 非空表示用了默认值
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: FieldValue,
    pub fallback: Option<InputError>,
}

impl Resolved {
    pub fn used_default(&self) -> bool {
        self.fallback.is_some()
    }
}

/// 含 `.` 按浮点解析，否则按整数解析（`1e5` 这类写法不接受）
fn parse_number(raw: &str) -> Option<f64> {
    let x = if raw.contains('.') {
        raw.parse::<f64>().ok()?
    } else {
        raw.parse::<i64>().ok()? as f64
    };
    x.is_finite().then_some(x)
}

pub fn parse_field(
    spec: &FieldSpec,
    raw: &str,
    categories: &Categories,
) -> Result<FieldValue, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::Empty);
    }

    match spec.kind {
        FieldKind::Numeric => parse_number(raw)
            .map(FieldValue::Number)
            .ok_or_else(|| InputError::NotNumeric(raw.to_string())),
        FieldKind::Categorical => {
            // 区分大小写：训练时的 dummy 列名就是原始取值
            if categories.contains(spec.name, raw) {
                Ok(FieldValue::Category(raw.to_string()))
            } else {
                Err(InputError::UnknownCategory {
                    field: spec.name.to_string(),
                    value: raw.to_string(),
                })
            }
        }
    }
}

pub fn resolve_field(spec: &FieldSpec, raw: &str, categories: &Categories) -> Resolved {
    match parse_field(spec, raw, categories) {
        Ok(value) => Resolved {
            value,
            fallback: None,
        },
        Err(e) => Resolved {
            value: spec.default.to_value(),
            fallback: Some(e),
        },
    }
}

/// JSON 记录里的值 -> 与终端输入相同的校验路径
///
/// - 数值/字符串：转成文本后走 `resolve_field`
/// - null：视为空输入
/// - 其他（bool/数组/对象）：不支持，回退默认值
pub fn resolve_json(spec: &FieldSpec, value: &Value, categories: &Categories) -> Resolved {
    let raw = match value {
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => {
            let kind = match other {
                Value::Bool(_) => "bool",
                Value::Array(_) => "array",
                _ => "object",
            };
            return Resolved {
                value: spec.default.to_value(),
                fallback: Some(InputError::UnsupportedJson {
                    field: spec.name.to_string(),
                    kind,
                }),
            };
        }
    };
    resolve_field(spec, &raw, categories)
}
