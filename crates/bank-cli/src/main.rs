use anyhow::{Context, Result};
use bank_core::{config::Config, pipeline::Predictor, schema::Record};
use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod prompt;

/// 交互式定期存款意向预测（bank-marketing LR）
#[derive(Parser, Debug)]
#[command(name = "bank-predict", author, version, about)]
struct Args {
    /// 产物目录：model.json / scaler.json / feature_names.json（可选 categories.json / policy.json）
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// 覆盖 policy.json 的判定阈值（P(yes) 严格大于阈值才判 yes）
    #[arg(long)]
    threshold: Option<f64>,

    /// 单次模式：从 JSON 文件读一条记录（缺失字段用样例值补齐）
    #[arg(long, conflicts_with = "sample")]
    input: Option<PathBuf>,

    /// 单次模式：直接对内置样例记录做预测
    #[arg(long)]
    sample: bool,

    /// 单次模式下输出 JSON
    #[arg(long)]
    json: bool,

    /// 退出时把 Prometheus 文本快照打到 stderr
    #[arg(long)]
    metrics: bool,

    /// tracing 过滤指令；缺省读 RUST_LOG，再缺省为 info
    #[arg(long)]
    log: Option<String>,
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(d) => EnvFilter::try_new(d).with_context(|| format!("invalid --log filter: {d}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // stdout 留给交互对话，日志走 stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn load_record(predictor: &Predictor, path: &Path) -> Result<Record> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read input record: {}", path.display()))?;
    let v: Value = serde_json::from_str(&s)
        .with_context(|| format!("parse input record: {}", path.display()))?;
    let obj: &Map<String, Value> = v
        .as_object()
        .with_context(|| format!("input record must be a JSON object: {}", path.display()))?;
    Ok(predictor.record_from_json(obj))
}

fn run_once(predictor: &Predictor, record: &Record, json: bool) -> Result<()> {
    let p = predictor.predict(record)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &p).context("write prediction json")?;
        writeln!(out)?;
    } else {
        prompt::render_prediction(&mut out, &p)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let prom: Option<PrometheusHandle> = if args.metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("install prometheus recorder")?,
        )
    } else {
        None
    };

    let cfg = Config::new(args.model_dir.clone()).with_threshold(args.threshold);
    let predictor = Predictor::from_config(&cfg)?;
    tracing::info!(
        model_dir = %cfg.model_dir.display(),
        threshold = predictor.threshold(),
        "predictor ready"
    );

    if let Some(path) = &args.input {
        let record = load_record(&predictor, path)?;
        run_once(&predictor, &record, args.json)?;
    } else if args.sample {
        run_once(&predictor, &Record::sample(), args.json)?;
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let rounds = prompt::run(&predictor, &mut stdin.lock(), &mut stdout.lock())?;
        tracing::info!(rounds, "session finished");
    }

    if let Some(h) = prom {
        eprintln!("{}", h.render());
    }
    Ok(())
}
