//! Output formatting helpers for CLI commands

use crate::catalog::ModelsConfig;
use crate::dashboard::view::latency_text;
use crate::health::{ProbeStatus, SweepEntry};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// One probed model, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub provider: String,
    pub model: String,
    pub url: String,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub latency_text: String,
}

impl ResultView {
    pub fn from_entry(entry: &SweepEntry, config: &ModelsConfig) -> Self {
        let url = config
            .get(&entry.provider, &entry.model)
            .map(|endpoint| endpoint.url.clone())
            .unwrap_or_default();

        Self {
            provider: entry.provider.clone(),
            model: entry.model.clone(),
            url,
            status: entry.result.status,
            latency_ms: entry.result.latency_ms,
            error: entry.result.error_message(),
            latency_text: latency_text(&entry.result),
        }
    }
}

/// Build display rows for a finished sweep, in sweep order
pub fn result_views(entries: &[SweepEntry], config: &ModelsConfig) -> Vec<ResultView> {
    entries
        .iter()
        .map(|entry| ResultView::from_entry(entry, config))
        .collect()
}

/// Format sweep results as a table
pub fn format_results_table(results: &[ResultView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Provider", "Model", "URL", "Status", "Latency"]);

    for r in results {
        let status_str = match r.status {
            ProbeStatus::Available => "Available".green().to_string(),
            ProbeStatus::Unavailable => "Unavailable".red().to_string(),
            ProbeStatus::Error => "Error".red().bold().to_string(),
        };

        table.add_row(vec![
            Cell::new(&r.provider),
            Cell::new(&r.model),
            Cell::new(&r.url),
            Cell::new(status_str),
            Cell::new(&r.latency_text),
        ]);
    }

    table.to_string()
}

/// Format sweep results as JSON
pub fn format_results_json(results: &[ResultView]) -> Result<String, serde_json::Error> {
    let available = results
        .iter()
        .filter(|r| r.status == ProbeStatus::Available)
        .count();

    serde_json::to_string_pretty(&json!({
        "results": results,
        "summary": {
            "total": results.len(),
            "available": available,
        }
    }))
}

/// One-line summary printed under the table
pub fn format_summary(results: &[ResultView]) -> String {
    let available = results
        .iter()
        .filter(|r| r.status == ProbeStatus::Available)
        .count();
    let line = format!("{}/{} models available", available, results.len());
    if available == results.len() {
        line.green().to_string()
    } else {
        line.yellow().to_string()
    }
}
