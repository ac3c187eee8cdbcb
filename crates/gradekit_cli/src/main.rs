mod config;
mod logging;

use std::fs;
use std::io::Read;

use anyhow::Context;
use clap::Parser;
use gradekit_io_xlsx::{
    XlsxWriter, build_evaluation_document, parse_payload, parse_render_options,
    suggested_file_name,
};

use crate::config::Config;
use crate::logging::init_standard_tracing;

fn read_payload(config: &Config) -> anyhow::Result<String> {
    if config.if_read_stdin() {
        let mut c_payload = String::new();
        std::io::stdin()
            .read_to_string(&mut c_payload)
            .context("Failed to read payload from stdin")?;
        return Ok(c_payload);
    }
    let path_input = config.input.as_deref().context("Missing --input path")?;
    fs::read_to_string(path_input)
        .with_context(|| format!("Failed to read payload {}", path_input.display()))
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_standard_tracing(env!("CARGO_CRATE_NAME"), &config.log_level);

    let c_payload = read_payload(&config)?;
    let payload = parse_payload(&c_payload)?;

    let c_options = match &config.options {
        Some(path_options) => Some(
            fs::read_to_string(path_options)
                .with_context(|| format!("Failed to read options {}", path_options.display()))?,
        ),
        None => None,
    };
    let cfg_options = parse_render_options(c_options.as_deref())?;

    let path_output = config
        .output
        .clone()
        .unwrap_or_else(|| suggested_file_name(&cfg_options).into());

    let document = build_evaluation_document(&payload, &cfg_options);
    XlsxWriter::new(&cfg_options.style)
        .save(&document, &path_output)
        .with_context(|| format!("Failed to export workbook to {}", path_output.display()))?;

    tracing::info!(
        output = %path_output.display(),
        n_evaluator_sheets = document.report.n_evaluator_sheets,
        n_summary_entries = document.report.n_summary_entries,
        n_warnings = document.report.warnings.len(),
        "export finished"
    );
    for c_warning in &document.report.warnings {
        tracing::warn!("{c_warning}");
    }
    Ok(())
}
