use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "gact")]
#[command(about = "GitHub user activity timeline: commits, pull requests, and issues")]
#[command(version)]
pub struct Cli {
    #[arg(help = "GitHub username to track")]
    pub username: String,

    #[arg(long = "org", help = "Restrict to repositories of this organization")]
    pub org: Option<String>,

    #[arg(long, help = "Start date (YYYY-MM-DD, inclusive)")]
    pub start_date: Option<String>,

    #[arg(long, help = "End date (YYYY-MM-DD, inclusive)")]
    pub end_date: Option<String>,

    #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
    pub output_format: OutputFormat,

    #[arg(long, help = "Mirror logs to this file (logs otherwise go to stderr only)")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::track::exec(self)
    }
}
