use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use disease_risk_core::{RiskLabel, RiskReport, RuleTable};

/// Output styles for reports and rule listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

pub fn render_report(report: &RiskReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => render_human_report(report),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
    }
}

fn render_human_report(report: &RiskReport) -> Result<String> {
    let label = report.risk_label.to_string();
    let label = match report.risk_label {
        RiskLabel::High => label.red().bold(),
        RiskLabel::Low => label.green().bold(),
    };
    let mut out = String::new();
    writeln!(out, "FINAL RESULT: {label}")?;
    writeln!(out, "Probability: {:.2} %", report.probability_percent)?;
    writeln!(out)?;
    writeln!(out, "DETAILED ANALYSIS:")?;
    for finding in &report.findings {
        writeln!(out, "- {}", finding.message)?;
    }
    writeln!(out)?;
    writeln!(out, "SUMMARY: {}", report.summary)?;
    Ok(out)
}

pub fn render_rules(table: &RuleTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => render_human_rules(table),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(table)?)),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(table)?),
    }
}

fn render_human_rules(table: &RuleTable) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{} rule(s) active", table.len())?;
    for rule in table.rules() {
        writeln!(
            out,
            "- {key:<16} {name:<16} healthy {low}..={high}",
            key = rule.field.key(),
            name = rule.name,
            low = rule.range.low,
            high = rule.range.high,
        )?;
    }
    Ok(out)
}
