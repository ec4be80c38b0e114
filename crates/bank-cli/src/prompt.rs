use anyhow::{Context, Result};
use bank_core::input::resolve_field;
use bank_core::pipeline::Predictor;
use bank_core::schema::{FieldKind, Prediction, Record, FIELDS};
use std::io::{BufRead, Write};

pub const WELCOME: &str = "Welcome to the Interactive Prediction Program!";
pub const GOODBYE: &str = "Exiting the program. Thank you!";

/// 读一行；EOF 返回 None
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut buf = String::new();
    let n = input.read_line(&mut buf).context("read stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// `['a', 'b', ...]`
fn format_options(options: &[String]) -> String {
    let quoted: Vec<String> = options.iter().map(|o| format!("'{o}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// 逐字段提问；非法或空输入都回退默认值并提示
pub fn collect_record<R: BufRead, W: Write>(
    predictor: &Predictor,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Record>> {
    let categories = predictor.categories();
    let mut record = Record::new();

    writeln!(
        out,
        "\nEnter values for the new data. Valid options are provided for each field."
    )?;
    for spec in &FIELDS {
        if spec.kind == FieldKind::Categorical {
            writeln!(
                out,
                "\n --------- Valid options for {}: {} --------- ",
                spec.name,
                format_options(categories.options(spec.name))
            )?;
        }
        write!(out, "\n{}: ", spec.name)?;
        out.flush()?;

        let Some(raw) = read_line(input)? else {
            return Ok(None);
        };
        let resolved = resolve_field(spec, &raw, categories);
        if let Some(e) = &resolved.fallback {
            writeln!(
                out,
                " <<<- Invalid input for {}. Using default value {}.",
                spec.name, resolved.value
            )?;
            tracing::debug!(field = spec.name, reason = %e, "using default");
        }
        record.set(spec.name, resolved.value);
    }
    Ok(Some(record))
}

pub fn render_prediction<W: Write>(out: &mut W, p: &Prediction) -> Result<()> {
    writeln!(
        out,
        "\nPredicted probabilities: {} = {:.2}, {} = {:.2}",
        p.negative_label, p.proba_negative, p.positive_label, p.proba_positive
    )?;
    writeln!(out, "\nThe predicted outcome is: {}", p.label)?;
    Ok(())
}

/// 交互主循环：提问 -> 预测 -> 是否继续
pub fn run<R: BufRead, W: Write>(predictor: &Predictor, input: &mut R, out: &mut W) -> Result<usize> {
    writeln!(out, "{WELCOME}")?;
    let mut rounds = 0usize;

    loop {
        let Some(record) = collect_record(predictor, input, out)? else {
            writeln!(out, "\n{GOODBYE}")?;
            break;
        };

        match predictor.predict(&record) {
            Ok(p) => {
                render_prediction(out, &p)?;
                rounds += 1;
            }
            Err(e) => {
                tracing::error!("prediction failed: {e:#}");
                writeln!(out, "Error during prediction: {e}")?;
            }
        }

        write!(out, "\nDo you want to input another set of data? (yes/no): ")?;
        out.flush()?;
        let cont = read_line(input)?.map(|s| s.to_lowercase());
        if cont.as_deref() != Some("yes") {
            writeln!(out, "{GOODBYE}")?;
            break;
        }
    }
    Ok(rounds)
}
