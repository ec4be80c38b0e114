// crates/bank-core/src/schema.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// 训练时 scaler 的输入列（顺序即 scaler 的列顺序）
pub const NUMERIC_COLS: [&str; 9] = [
    "age",
    "campaign",
    "pdays",
    "previous",
    "emp.var.rate",
    "cons.price.idx",
    "cons.conf.idx",
    "euribor3m",
    "nr.employed",
];

/// 训练时做 one-hot 的列
pub const CATEGORICAL_COLS: [&str; 10] = [
    "job",
    "marital",
    "education",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "day_of_week",
    "poutcome",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Num(f64),
    Cat(&'static str),
}

impl SampleValue {
    pub fn to_value(self) -> FieldValue {
        match self {
            SampleValue::Num(x) => FieldValue::Number(x),
            SampleValue::Cat(s) => FieldValue::Category(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// 输入缺失/非法时的回退值
    pub default: SampleValue,
}

const fn num(name: &'static str, v: f64) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Numeric,
        default: SampleValue::Num(v),
    }
}

const fn cat(name: &'static str, v: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Categorical,
        default: SampleValue::Cat(v),
    }
}

/// 交互式提问顺序，同时也是样例记录。
pub const FIELDS: [FieldSpec; 19] = [
    num("age", 35.0),
    cat("job", "technician"),
    cat("marital", "married"),
    cat("education", "university.degree"),
    cat("default", "no"),
    cat("housing", "yes"),
    cat("loan", "no"),
    cat("contact", "telephone"),
    cat("month", "may"),
    cat("day_of_week", "mon"),
    num("campaign", 1.0),
    num("pdays", 999.0),
    num("previous", 0.0),
    cat("poutcome", "nonexistent"),
    num("emp.var.rate", 1.1),
    num("cons.price.idx", 93.994),
    num("cons.conf.idx", -36.4),
    num("euribor3m", 4.857),
    num("nr.employed", 5191.0),
];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(x) => Some(*x),
            FieldValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Category(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(x) => write!(f, "{x}"),
            FieldValue::Category(s) => f.write_str(s),
        }
    }
}

/// 单条待预测记录：字段名 -> 值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample() -> Self {
        let mut r = Self::new();
        for f in &FIELDS {
            r.set(f.name, f.default.to_value());
        }
        r
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 补齐缺失列（用样例值），返回补了几列
    pub fn fill_missing(&mut self) -> usize {
        let mut filled = 0usize;
        for f in &FIELDS {
            if !self.values.contains_key(f.name) {
                self.values.insert(f.name.to_string(), f.default.to_value());
                filled += 1;
            }
        }
        filled
    }
}

/// 每个类别列允许的取值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories {
    by_field: BTreeMap<String, Vec<String>>,
}

impl Categories {
    pub fn builtin() -> Self {
        let table: [(&str, &[&str]); 10] = [
            (
                "job",
                &[
                    "housemaid",
                    "services",
                    "admin.",
                    "blue-collar",
                    "technician",
                    "retired",
                    "management",
                    "unemployed",
                    "self-employed",
                    "unknown",
                    "entrepreneur",
                    "student",
                ],
            ),
            ("marital", &["married", "single", "divorced", "unknown"]),
            (
                "education",
                &[
                    "basic.4y",
                    "high.school",
                    "basic.6y",
                    "basic.9y",
                    "professional.course",
                    "unknown",
                    "university.degree",
                    "illiterate",
                ],
            ),
            ("default", &["no", "yes", "unknown"]),
            ("housing", &["no", "yes", "unknown"]),
            ("loan", &["no", "yes", "unknown"]),
            ("contact", &["telephone", "cellular"]),
            (
                "month",
                &["may", "jun", "jul", "aug", "oct", "nov", "dec", "mar", "apr", "sep"],
            ),
            ("day_of_week", &["mon", "tue", "wed", "thu", "fri"]),
            ("poutcome", &["nonexistent", "failure", "success"]),
        ];

        let by_field = table
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect();
        Self { by_field }
    }

    /// 用产物里的 categories.json 覆盖对应字段，其余字段保留内置列表
    pub fn merged_with(mut self, overrides: Categories) -> Self {
        for (k, vs) in overrides.by_field {
            self.by_field.insert(k, vs);
        }
        self
    }

    pub fn options(&self, field: &str) -> &[String] {
        self.by_field.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.options(field).iter().any(|v| v == value)
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingsUs {
    pub fill: u64,
    pub encode: u64,
    pub scale: u64,
    pub assemble: u64,
    pub predict: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub trace_id: Uuid,
    pub negative_label: String,
    pub positive_label: String,
    pub proba_negative: f64,
    pub proba_positive: f64,
    pub label: String,
    pub timings_us: TimingsUs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_cover_numeric_and_categorical_columns() {
        assert_eq!(FIELDS.len(), NUMERIC_COLS.len() + CATEGORICAL_COLS.len());
        for name in NUMERIC_COLS {
            assert_eq!(field(name).map(|f| f.kind), Some(FieldKind::Numeric), "{name}");
        }
        for name in CATEGORICAL_COLS {
            assert_eq!(field(name).map(|f| f.kind), Some(FieldKind::Categorical), "{name}");
        }
    }

    #[test]
    fn sample_defaults_are_valid_categories() {
        let cats = Categories::builtin();
        for f in FIELDS.iter().filter(|f| f.kind == FieldKind::Categorical) {
            let SampleValue::Cat(v) = f.default else {
                panic!("{} default is not a category", f.name);
            };
            assert!(cats.contains(f.name, v), "{}={v}", f.name);
        }
    }

    #[test]
    fn fill_missing_only_adds_absent_columns() {
        let mut r = Record::new();
        r.set("age", FieldValue::Number(50.0));
        r.set("job", FieldValue::Category("student".into()));

        let filled = r.fill_missing();
        assert_eq!(filled, FIELDS.len() - 2);
        assert_eq!(r.len(), FIELDS.len());
        assert_eq!(r.get("age"), Some(&FieldValue::Number(50.0)));
        assert_eq!(r.get("job").and_then(|v| v.as_category()), Some("student"));
        assert_eq!(r.get("pdays"), Some(&FieldValue::Number(999.0)));
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let mut r = Record::new();
        r.set("age", FieldValue::Number(41.0));
        r.set("month", FieldValue::Category("jun".into()));

        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"age":41.0,"month":"jun"}"#);

        let back: Record = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn overrides_replace_only_named_fields() {
        let overrides: Categories =
            serde_json::from_str(r#"{"contact": ["telephone", "cellular", "email"]}"#).unwrap();
        let cats = Categories::builtin().merged_with(overrides);
        assert!(cats.contains("contact", "email"));
        assert!(cats.contains("month", "may"));
        assert!(!cats.contains("month", "jan"));
    }

    #[test]
    fn number_display_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(35.0).to_string(), "35");
        assert_eq!(FieldValue::Number(93.994).to_string(), "93.994");
        assert_eq!(FieldValue::Number(-36.4).to_string(), "-36.4");
    }
}
