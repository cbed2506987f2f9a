//! Extract command - run the upload pipeline on a local file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use invoscan_core::api::UploadResponse;
use invoscan_core::{ExtractionResult, LineItem, Pipeline};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF, PNG or JPEG)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Same JSON body as the HTTP API
    Json,
    /// Line items as CSV
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let pipeline = Pipeline::from_config(config)?;
    let result = pipeline.run_file(&args.input)?;

    let output = format_result(result, args.format, &pipeline)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn format_result(result: ExtractionResult, format: OutputFormat, pipeline: &Pipeline) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let response = UploadResponse::from_result(result, &pipeline.config().response);
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Csv => format_csv(&result.items),
        OutputFormat::Text => Ok(format_text(&result)),
    }
}

pub(crate) fn format_csv(items: &[LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["number", "description", "unit_price", "quantity", "amount"])?;
    for item in items {
        wtr.write_record([
            item.number.as_deref().unwrap_or_default(),
            item.description.as_str(),
            item.unit_price.as_str(),
            item.quantity.as_str(),
            item.amount.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub(crate) fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n\n", result.source));

    output.push_str("Items:\n");
    if result.items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &result.items {
        output.push_str(&format!(
            "  {} x {} @ {} = {}\n",
            item.quantity, item.description, item.unit_price, item.amount
        ));
    }
    output.push('\n');

    output.push_str("Payment details:\n");
    for (key, value) in result.payment_details.iter() {
        output.push_str(&format!("  {}: {}\n", key, value.as_str()));
    }

    output
}
