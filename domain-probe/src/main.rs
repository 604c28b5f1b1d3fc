//! Domain Probe CLI Application
//!
//! A command-line interface for checking whether a domain is available,
//! using the DNS, NS and WHOIS checks of domain-probe-lib.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_probe_lib::{
    load_env_config, parse_timeout, CheckConfig, ConfigManager, DomainCheckResponse,
    DomainChecker, EnvConfig, FileConfig, ResolverProvider,
};
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-probe
#[derive(Parser, Debug)]
#[command(name = "domain-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domain availability using DNS, NS and WHOIS")]
#[command(
    long_about = "Check whether a domain is available for registration.\n\nRuns a DNS lookup, then an NS lookup, then a WHOIS query, stopping at the first check that indicates the domain is available (use --force-all to run all three)."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain name to check (e.g. example.com)
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Run every check even after one indicates availability
    #[arg(short = 'a', long = "force-all", help_heading = "Checks")]
    pub force_all: bool,

    /// Output the result as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Colored output with a header
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// DNS resolver: system, google, cloudflare or quad9
    #[arg(long = "resolver", value_name = "NAME", help_heading = "Protocol")]
    pub resolver: Option<String>,

    /// Query this WHOIS server instead of following the IANA referral
    #[arg(long = "whois-server", value_name = "HOST", help_heading = "Protocol")]
    pub whois_server: Option<String>,

    /// Timeout for DNS and WHOIS lookups (e.g. 5s, 2m)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Protocol")]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show error details for failed checks and debug logs
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Effective settings after layering defaults, config files, environment
/// and command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub check: CheckConfig,
    pub force_all: bool,
    pub json: bool,
    pub pretty: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(&args);

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_domain_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,domain_probe={0},domain_probe_lib={0}",
            level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.domain.trim().is_empty() {
        return Err("You must specify a domain name to check".to_string());
    }

    if args.json && args.pretty {
        return Err("Cannot specify both --json and --pretty".to_string());
    }

    Ok(())
}

async fn run_domain_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args, &load_env_config())?;
    debug!(settings = ?settings, "effective settings");

    let domain = args.domain.trim();
    let checker = DomainChecker::with_config(settings.check.clone())?;

    if settings.pretty && !settings.json {
        ui::print_header(domain, &settings);
    }

    let response = checker.check_domain(domain, settings.force_all).await;

    display_response(&response, &settings, args.debug)
}

/// Build settings from all configuration sources.
///
/// Precedence (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (DP_*)
/// 3. Config file (--config / DP_CONFIG, or discovered local, global, XDG)
/// 4. Built-in defaults
fn build_settings(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let file_config = if let Some(path) = args.config.as_ref().or(env_config.config.as_ref()) {
        debug!(path = %path, "using explicit config file");
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                warn!("Config discovery warning: {}", e);
                FileConfig::default()
            }
        }
    };

    let settings = apply_file_config(Settings::default(), file_config);
    let settings = apply_environment_config(settings, env_config);
    apply_cli_args(settings, args)
}

/// Merge FileConfig into Settings
fn apply_file_config(mut settings: Settings, file_config: FileConfig) -> Settings {
    // Values were validated when the file was loaded.
    if let Some(defaults) = file_config.defaults {
        if let Some(force_all) = defaults.force_all {
            settings.force_all = force_all;
        }
        if let Some(json) = defaults.json {
            settings.json = json;
        }
        if let Some(pretty) = defaults.pretty {
            settings.pretty = pretty;
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout) {
            settings.check = settings.check.with_timeout(timeout);
        }
    }

    if let Some(resolver) = file_config.resolver {
        if let Some(provider) = resolver.provider.and_then(|p| p.parse::<ResolverProvider>().ok()) {
            settings.check = settings.check.with_resolver(provider);
        }
        if let Some(timeout) = resolver.timeout.as_deref().and_then(parse_timeout) {
            settings.check = settings.check.with_dns_timeout(timeout);
        }
    }

    if let Some(whois) = file_config.whois {
        if let Some(server) = whois.server {
            settings.check = settings.check.with_whois_server(server);
        }
        if let Some(timeout) = whois.timeout.as_deref().and_then(parse_timeout) {
            settings.check = settings.check.with_whois_timeout(timeout);
        }
    }

    settings
}

/// Apply environment variables to settings.
fn apply_environment_config(mut settings: Settings, env_config: &EnvConfig) -> Settings {
    if let Some(force_all) = env_config.force_all {
        settings.force_all = force_all;
    }
    if let Some(json) = env_config.json {
        settings.json = json;
    }
    if let Some(pretty) = env_config.pretty {
        settings.pretty = pretty;
    }
    if let Some(timeout) = env_config.timeout {
        settings.check = settings.check.with_timeout(timeout);
    }
    if let Some(provider) = env_config.resolver {
        settings.check = settings.check.with_resolver(provider);
    }
    if let Some(server) = &env_config.whois_server {
        settings.check = settings.check.with_whois_server(server.clone());
    }
    settings
}

/// Apply CLI arguments to settings (highest precedence).
fn apply_cli_args(
    mut settings: Settings,
    args: &Args,
) -> Result<Settings, Box<dyn std::error::Error>> {
    // Only override boolean settings when the user explicitly passes the flag.
    // Without this guard, the default (false) would always overwrite config/env values.
    if args.force_all {
        settings.force_all = true;
    }
    if args.json {
        settings.json = true;
        settings.pretty = false;
    }
    if args.pretty {
        settings.pretty = true;
        settings.json = false;
    }

    if let Some(name) = &args.resolver {
        let provider: ResolverProvider = name.parse()?;
        settings.check = settings.check.with_resolver(provider);
    }

    if let Some(server) = &args.whois_server {
        let server = server.trim();
        if server.is_empty() || server.contains(char::is_whitespace) {
            return Err(format!("Invalid WHOIS server '{}'", server).into());
        }
        settings.check = settings.check.with_whois_server(server);
    }

    if let Some(timeout_str) = &args.timeout {
        let timeout = parse_timeout(timeout_str).ok_or_else(|| {
            format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout_str
            )
        })?;
        settings.check = settings.check.with_timeout(timeout);
    }

    Ok(settings)
}

fn display_response(
    response: &DomainCheckResponse,
    settings: &Settings,
    debug: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else if settings.pretty {
        ui::print_pretty(response, debug);
    } else {
        for line in ui::plain_lines(response, debug) {
            println!("{}", line);
        }
    }

    Ok(())
}
