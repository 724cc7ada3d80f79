use clap::Parser;
use log::error;
use sales_report::{MissingKeyPolicy, PipelineError, ReportConfig, ReportPipeline};
use std::path::PathBuf;
use std::process::ExitCode;

/// Generates a PDF sales report from a CSV file with Region, Product and Sales columns.
#[derive(Parser, Debug)]
#[command(name = "sales-report", version, about)]
struct Cli {
    /// JSON configuration file. Flags given on the command line override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV file to read.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the PDF.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path of the temporary chart image.
    #[arg(long)]
    chart: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Drop rows with a blank Region or Product instead of grouping them under an empty key.
    #[arg(long)]
    drop_blank_keys: bool,
}

impl Cli {
    fn into_config(self) -> Result<ReportConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)?,
            None => ReportConfig::default(),
        };
        if let Some(input) = self.input {
            config = config.with_input(input);
        }
        if let Some(output) = self.output {
            config = config.with_output(output);
        }
        if let Some(chart) = self.chart {
            config = config.with_chart_path(chart);
        }
        if let Some(title) = self.title {
            config = config.with_title(title);
        }
        if let Some(author) = self.author {
            config = config.with_author(author);
        }
        if self.drop_blank_keys {
            config = config.with_missing_keys(MissingKeyPolicy::Drop);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = Cli::parse()
        .into_config()
        .and_then(ReportPipeline::new)
        .and_then(|pipeline| pipeline.run());

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ PipelineError::Config(_)) => {
            error!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("Report generation stopped during {}: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
