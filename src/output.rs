//! Rendering of extracted certificate records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::CertificateInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Summary,
}

/// A certificate record together with where it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateReport {
    pub source: String,
    #[serde(flatten)]
    pub info: CertificateInfo,
}

pub fn render(
    reports: &[CertificateReport],
    format: OutputFormat,
    now: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(reports, now)),
        OutputFormat::Json => serde_json::to_string_pretty(reports),
        OutputFormat::Summary => Ok(render_summary(reports, now)),
    }
}

fn render_text(reports: &[CertificateReport], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for report in reports {
        let info = &report.info;
        out.push_str("--------------------------------------\n");
        out.push_str(&format!("File: {}\n", report.source));
        out.push_str("Subject:\n");
        out.push_str(&name_lines(&info.subject));
        out.push_str("Issuer:\n");
        out.push_str(&name_lines(&info.issuer));
        out.push_str(&format!(
            "Version: {}\nCA: {}\nValid from: {}\nValid to: {}\nDays left: {}\nExpired: {}\n",
            info.version,
            info.basic_constraints_ca,
            format_time(info.not_before),
            format_time(info.not_after),
            info.validity_days_at(now),
            info.is_expired_at(now),
        ));
    }
    out
}

fn name_lines(name: &BTreeMap<String, String>) -> String {
    if name.is_empty() {
        return "\t(empty)\n".to_string();
    }
    name.iter()
        .map(|(key, value)| format!("\t{}: {}\n", key, value))
        .collect()
}

fn render_summary(reports: &[CertificateReport], now: DateTime<Utc>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "File", "Subject", "Issuer", "Version", "CA", "Not After", "Days Left", "Status",
    ]);

    for report in reports {
        let info = &report.info;
        table.add_row(vec![
            report.source.clone(),
            common_name(&info.subject),
            common_name(&info.issuer),
            info.version.to_string(),
            info.basic_constraints_ca.to_string(),
            format_time(info.not_after),
            info.validity_days_at(now).to_string(),
            status(info, now).to_string(),
        ]);
    }

    table.to_string()
}

fn common_name(name: &BTreeMap<String, String>) -> String {
    name.get("CN")
        .or_else(|| name.get("O"))
        .cloned()
        .unwrap_or_else(|| "-".to_string())
}

fn status(info: &CertificateInfo, now: DateTime<Utc>) -> &'static str {
    if info.is_expired_at(now) {
        "expired"
    } else if info.not_before > now {
        "not yet valid"
    } else {
        "valid"
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
