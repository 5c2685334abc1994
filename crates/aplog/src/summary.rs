use std::path::Path;

use colored::Colorize;

use aplog_sessions::{reason_description, RunSummary};

pub fn print_summary(summary: &RunSummary, output: &Path) {
    println!("{}", "=== Run Summary ===".bright_blue().bold());
    println!("{}  {}", "Sessions:".dimmed(), summary.total_sessions);
    println!(
        "    {} completed, {} open, {} orphaned disconnects",
        summary.completed_sessions.to_string().bright_green(),
        summary.associate_only.to_string().bright_yellow(),
        summary.disassociate_only.to_string().bright_red()
    );
    println!("{}  {}", "Clients:".dimmed(), summary.unique_clients);
    println!(
        "{}  {} ({} channel switches)",
        "System Parameter Changes:".dimmed(),
        summary.system_changes,
        summary.channel_switches
    );
    println!("{}  {}", "Skip Events:".dimmed(), summary.skip_events);
    println!("{}  {}", "Other Events:".dimmed(), summary.other_events);

    if !summary.reason_codes.is_empty() {
        println!();
        println!("{}", "Disconnect Reasons:".dimmed());
        for (code, count) in &summary.reason_codes {
            println!("  {:<30} {}", reason_label(code), count);
        }
    }

    println!();
    println!("{}  {}", "Report:".dimmed(), output.display());
}

fn reason_label(code: &str) -> String {
    match (code, reason_description(code)) {
        ("", _) => "(no reason code)".to_string(),
        (code, Some(description)) => format!("{} - {}", code, description),
        (code, None) => code.to_string(),
    }
}
