//! Formatting and reporting for preflight results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::{CheckResult, SystemCheck};
use super::runner::PreflightReport;

const RULE_WIDTH: usize = 60;
const TITLE: &str = "🧪 Lab Intelligence Chatbot - Setup Test";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Formats the banner printed before any check runs
pub fn format_banner() -> String {
    format!("{}\n{}\n{}", rule(), TITLE.bold(), rule())
}

/// Formats the heading printed when a check starts
pub fn format_check_heading(check: &dyn SystemCheck) -> String {
    check.heading().bold().to_string()
}

/// Formats a finished check's diagnostic lines
pub fn format_check_details(result: &CheckResult) -> String {
    result.details.join("\n")
}

/// Formats the summary as one `Name: STATUS` line per check
pub fn format_summary_lines(report: &PreflightReport) -> String {
    report
        .results
        .iter()
        .map(|(name, result)| format!("{}: {}", name, result.status.as_colored_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the summary as a table with durations and messages
pub fn format_summary_table(report: &PreflightReport) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Check", "Status", "Duration", "Message"]);

    for (name, result) in &report.results {
        let duration_str = format!("{:.2?}", result.duration);
        builder.push_record([
            name.as_str(),
            &result.status.as_colored_str(),
            &duration_str,
            &result.message,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Formats the closing guidance: next steps on success, a warning otherwise
pub fn format_outcome(report: &PreflightReport, next_steps: &[String]) -> String {
    let mut outcome = String::new();

    if report.all_passed() {
        outcome.push_str(&format!(
            "{}\n",
            "🎉 All tests passed! You're ready to start the application."
                .green()
                .bold()
        ));
        if !next_steps.is_empty() {
            outcome.push_str("\nNext steps:\n");
            for (i, step) in next_steps.iter().enumerate() {
                outcome.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }
    } else {
        outcome.push_str(&format!(
            "{}\n",
            "⚠️  Some tests failed. Please fix the issues above."
                .yellow()
                .bold()
        ));
    }

    outcome
}

/// Formats everything printed after the checks have run
pub fn format_report(report: &PreflightReport, next_steps: &[String], as_table: bool) -> String {
    let summary = if as_table {
        format_summary_table(report)
    } else {
        format_summary_lines(report)
    };

    format!(
        "\n{}\n{}\n{}\n{}\n\n{}",
        rule(),
        "📊 Test Results Summary".bold(),
        rule(),
        summary,
        format_outcome(report, next_steps)
    )
}

/// Prints the summary and closing guidance to stdout
pub fn print_report(report: &PreflightReport, next_steps: &[String], as_table: bool) {
    print!("{}", format_report(report, next_steps, as_table));
}
