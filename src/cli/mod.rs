//! CLI command handling

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ufrate::services::normalizer::{format_amount, parse_amount};
use ufrate::{Config, RateLookupService};

/// Current UF (Unidad de Fomento) with multi-source fallback
#[derive(Parser)]
#[command(name = "ufrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.ufrate/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Don't read or write the on-disk cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Per-source HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current UF value (default)
    Value {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Ignore the cached value and query the sources
        #[arg(long)]
        refresh: bool,
    },

    /// Show value, date, source and fallback status
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a CLP amount to UF
    Convert {
        /// Amount in pesos, e.g. 1000000 or 1.000.000
        #[arg(value_parser = parse_clp)]
        amount: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the cached UF value
    ClearCache,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout.max(1);
        }

        let service = if self.no_cache {
            RateLookupService::from_config_uncached(&config)?
        } else {
            RateLookupService::from_config(&config)?
        };

        match self.command {
            None => run_value(&service, false, false),
            Some(Commands::Value { json, refresh }) => run_value(&service, json, refresh),
            Some(Commands::Info { json }) => run_info(&service, json),
            Some(Commands::Convert { amount, json }) => run_convert(&service, amount, json),
            Some(Commands::ClearCache) => {
                service.clear_cache()?;
                println!("Cache cleared");
                Ok(())
            }
        }
    }
}

fn parse_clp(input: &str) -> Result<f64, String> {
    match parse_amount(input) {
        Some(v) if v >= 0.0 => Ok(v),
        Some(_) => Err("amount must not be negative".to_string()),
        None => Err(format!("not an amount: {}", input)),
    }
}

/// Print the current value
fn run_value(service: &RateLookupService, json: bool, refresh: bool) -> anyhow::Result<()> {
    let result = if refresh {
        service.refresh()
    } else {
        service.get_value()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", ufrate::services::lookup::format_result(&result));
    }
    Ok(())
}

/// Print value, date, source and status
fn run_info(service: &RateLookupService, json: bool) -> anyhow::Result<()> {
    let info = service.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("UF:        {}", info.formatted_value);
    println!("Date:      {}", info.date);
    println!("Source:    {}", info.source);
    println!("Sources:   {}", service.source_names().join(", "));
    if info.is_simulated {
        println!("Status:    simulated (all sources failed)");
    }
    if let Some(error) = info.error {
        println!("Error:     {}", error);
    }
    Ok(())
}

/// Print a CLP → UF conversion
fn run_convert(service: &RateLookupService, amount: f64, json: bool) -> anyhow::Result<()> {
    let conversion = service.convert_amount(amount)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversion)?);
        return Ok(());
    }

    let marker = if conversion.simulated {
        " (simulated)"
    } else {
        ""
    };
    println!(
        "${} = {} UF (UF ${} on {}{})",
        conversion.amount_formatted,
        conversion.amount_uf_formatted,
        format_amount(conversion.uf_value, 2),
        conversion.date,
        marker
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["ufrate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_cache);
    }

    #[test]
    fn test_cli_parse_value() {
        let cli = Cli::try_parse_from(["ufrate", "value"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Value {
                json: false,
                refresh: false
            })
        ));
    }

    #[test]
    fn test_cli_parse_value_json_refresh() {
        let cli = Cli::try_parse_from(["ufrate", "value", "--json", "--refresh"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Value {
                json: true,
                refresh: true
            })
        ));
    }

    #[test]
    fn test_cli_parse_info_json() {
        let cli = Cli::try_parse_from(["ufrate", "info", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Info { json: true })));
    }

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::try_parse_from(["ufrate", "convert", "1000000"]).unwrap();
        match cli.command {
            Some(Commands::Convert { amount, json }) => {
                assert_eq!(amount, 1_000_000.0);
                assert!(!json);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_parse_convert_localized_amount() {
        let cli = Cli::try_parse_from(["ufrate", "convert", "1.500.000,50", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Convert { amount, json }) => {
                assert_eq!(amount, 1_500_000.5);
                assert!(json);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_parse_convert_rejects_garbage() {
        assert!(Cli::try_parse_from(["ufrate", "convert", "lots"]).is_err());
    }

    #[test]
    fn test_cli_parse_clear_cache() {
        let cli = Cli::try_parse_from(["ufrate", "clear-cache"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ClearCache)));
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "ufrate",
            "info",
            "--no-cache",
            "--timeout",
            "15",
            "--config",
            "/tmp/uf.json",
        ])
        .unwrap();
        assert!(cli.no_cache);
        assert_eq!(cli.timeout, Some(15));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/uf.json")));
    }

    #[test]
    fn test_cli_parse_unknown_command() {
        assert!(Cli::try_parse_from(["ufrate", "daily"]).is_err());
    }
}
