//! Rules command - write and try out extraction rule tables.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invoscan_core::invoice::InvoiceExtractor;
use invoscan_core::{RawText, RuleTable};

use super::extract::format_text;
use super::load_config;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    command: RulesCommand,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Write the built-in rule table as JSON
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the extractors on a text file
    Test {
        /// Text file, e.g. saved OCR output
        text_file: PathBuf,

        /// Rule table to use (default: configured rules or built-in)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(args: RulesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        RulesCommand::Init { output, force } => init_rules(output, force),
        RulesCommand::Test {
            text_file,
            rules,
            json,
        } => test_rules(text_file, rules, json, config_path),
    }
}

fn init_rules(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let json = RuleTable::default().to_json()?;

    let Some(path) = output else {
        println!("{}", json);
        return Ok(());
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Rules file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, json)?;

    println!(
        "{} Wrote default rules to {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn test_rules(
    text_file: PathBuf,
    rules: Option<PathBuf>,
    json: bool,
    config_path: Option<&str>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if rules.is_some() {
        config.extraction.rules_file = rules;
    }

    let compiled = invoscan_core::pipeline::load_rules(&config)?;
    let text = fs::read_to_string(&text_file)?;

    let result = InvoiceExtractor::new(compiled).extract(RawText::new(text), "text-file");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "paymentDetails": result.payment_details,
                "items": result.items,
            }))?
        );
    } else {
        print!("{}", format_text(&result));
    }
    Ok(())
}
