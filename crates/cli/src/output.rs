//! Rendering of info records for the terminal

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;
use tabled::{Table, Tabled};

use repoinf_core::domain::{FieldValue, PlatformInfo, RepositoryInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Field/value table
    Table,
    /// Single line for version banners
    Banner,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: &FieldValue) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

fn repo_rows(info: &RepositoryInfo) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("isRepo", &FieldValue::Bool(info.is_repo)),
        FieldRow::new("hasCommits", &FieldValue::Bool(info.has_commits)),
    ];
    rows.extend(
        info.fields
            .iter()
            .chain(info.formatted.iter())
            .map(|(name, value)| FieldRow::new(name, value)),
    );
    rows
}

fn platform_rows(info: &PlatformInfo) -> Vec<FieldRow> {
    info.facts
        .iter()
        .chain(info.formatted.iter())
        .map(|(name, value)| FieldRow::new(name, value))
        .collect()
}

fn repo_banner(info: &RepositoryInfo) -> String {
    match info.version() {
        Some(version) => version.to_string(),
        None if !info.is_repo => "not a repository".to_string(),
        None => "unknown".to_string(),
    }
}

fn platform_banner(info: &PlatformInfo) -> String {
    ["type", "release", "arch"]
        .iter()
        .filter_map(|name| info.get(name))
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_repo(info: &RepositoryInfo, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(info)?,
        OutputFormat::Table => format!(
            "{}\n{}",
            "Repository".cyan().bold(),
            Table::new(repo_rows(info))
        ),
        OutputFormat::Banner => repo_banner(info),
    })
}

pub fn render_platform(info: &PlatformInfo, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(info)?,
        OutputFormat::Table => format!(
            "{}\n{}",
            "Platform".cyan().bold(),
            Table::new(platform_rows(info))
        ),
        OutputFormat::Banner => platform_banner(info),
    })
}

pub fn render_all(
    repo: &RepositoryInfo,
    platform: &PlatformInfo,
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&json!({ "repo": repo, "platform": platform }))?
        }
        OutputFormat::Table | OutputFormat::Banner => format!(
            "{}\n{}",
            render_repo(repo, format)?,
            render_platform(platform, format)?
        ),
    })
}
