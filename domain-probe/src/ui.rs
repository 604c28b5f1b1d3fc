//! Text-mode display logic for the domain-probe CLI.
//!
//! Plain output is one verdict line followed by one line per check. `--pretty`
//! adds a header, colors and aligned columns. Uses only the `console` crate.

use console::{pad_str, style, Alignment, StyledObject};
use domain_probe_lib::{CheckResult, CheckStatus, DomainCheckResponse};

use crate::Settings;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain: &str, settings: &Settings) {
    println!(
        "{} {} {}",
        style("domain-probe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!("- Checking {}", domain)).dim(),
    );
    println!("{}", style(header_meta(settings)).dim());
    println!();
}

fn header_meta(settings: &Settings) -> String {
    let check = &settings.check;
    let mut meta_parts = vec![format!("Resolver: {}", check.resolver)];
    meta_parts.push(format!(
        "WHOIS: {}",
        check.whois_server.as_deref().unwrap_or("IANA referral")
    ));
    if settings.force_all {
        meta_parts.push("All checks".to_string());
    }
    meta_parts.join(" | ")
}

// ── Plain output ─────────────────────────────────────────────────────────────

/// Plain output lines: verdict, then one line per check.
pub fn plain_lines(response: &DomainCheckResponse, debug: bool) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", response.domain, verdict(response))];

    for (kind, result) in &response.checks {
        lines.push(format!(
            "  {:<6} {:<8} {}",
            kind.key(),
            result.status(),
            result.details()
        ));
        if debug {
            if let Some(error) = result.error_info() {
                lines.push(format!("         error: {}", error));
            }
        }
    }

    lines
}

// ── Pretty output ────────────────────────────────────────────────────────────

/// Print the verdict and per-check lines with colors and alignment.
pub fn print_pretty(response: &DomainCheckResponse, debug: bool) {
    let domain_width = 30;
    let padded_domain = pad_str(&response.domain, domain_width, Alignment::Left, Some(".."));

    let label = if response.is_available {
        style(verdict(response)).green().bold()
    } else {
        style(verdict(response)).red().bold()
    };
    println!("  {}  {}", style(&padded_domain).white(), label);

    for (kind, result) in &response.checks {
        println!(
            "    {} {}  {}",
            style(format!("{:<6}", kind.key())).bold(),
            status_label(result),
            style(result.details()).dim(),
        );

        if debug {
            if let Some(error) = result.error_info() {
                println!("           {} {}", style("└─").dim(), style(error).yellow());
            }
        }
    }
}

fn status_label(result: &CheckResult) -> StyledObject<String> {
    let label = format!("{:<8}", result.status().as_str().to_uppercase());
    match result.status() {
        CheckStatus::Passed => style(label).green(),
        CheckStatus::Failed => style(label).red(),
        CheckStatus::Skipped => style(label).dim(),
        CheckStatus::Error => style(label).yellow(),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn verdict(response: &DomainCheckResponse) -> &'static str {
    if response.is_available {
        "AVAILABLE"
    } else {
        "TAKEN"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
