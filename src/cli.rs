use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::Manager;

#[derive(Parser, Debug)]
#[command(
    name = "mailcheck-store",
    version,
    about = "Proxy quota, email validation cache and flagged-domain lookups backed by Redis"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MAILCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Redis address, overrides the configuration file
    #[arg(long, value_name = "ADDR")]
    pub redis_addr: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "MAILCHECK_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Pick a random proxy that still has quota
    Proxy,

    /// Cache an email validation result
    SaveEmail {
        email: String,

        #[arg(allow_negative_numbers = true)]
        status: i8,

        /// How long the result stays cached; 0 or less keeps it forever
        #[arg(long, default_value_t = 24, allow_negative_numbers = true)]
        lifetime_hours: i16,
    },

    /// Look up a cached email validation result
    CheckEmail { email: String },

    /// Check whether a domain is flagged
    CheckDomain { domain: String },
}

impl Commands {
    /// Run the command and render its result as a JSON value
    pub async fn execute(&self, manager: &Manager) -> Result<serde_json::Value> {
        let output = match self {
            Self::Proxy => serde_json::to_value(manager.fast_proxy().await?)?,
            Self::SaveEmail {
                email,
                status,
                lifetime_hours,
            } => {
                manager.save_email(email, *status, *lifetime_hours).await?;
                serde_json::json!({ "saved": email })
            }
            Self::CheckEmail { email } => serde_json::to_value(manager.check_email(email).await?)?,
            Self::CheckDomain { domain } => serde_json::Value::Bool(manager.check_domain(domain).await?),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_status() {
        let cli = Cli::try_parse_from(["mailcheck-store", "save-email", "a@b.c", "-1"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::SaveEmail {
                email: "a@b.c".to_string(),
                status: -1,
                lifetime_hours: 24,
            }
        );
    }

    #[test]
    fn parses_global_options() {
        let cli = Cli::try_parse_from([
            "mailcheck-store",
            "--redis-addr",
            "10.1.2.3:6379",
            "check-domain",
            "mailinator.com",
        ])
        .unwrap();
        assert_eq!(cli.redis_addr.as_deref(), Some("10.1.2.3:6379"));
        assert_eq!(
            cli.command,
            Commands::CheckDomain {
                domain: "mailinator.com".to_string()
            }
        );
    }

    #[test]
    #[serial_test::serial]
    fn config_path_comes_from_environment() {
        std::env::set_var("MAILCHECK_CONFIG", "/etc/mailcheck/env.yaml");
        let from_env = Cli::try_parse_from(["mailcheck-store", "proxy"]).unwrap();
        let explicit =
            Cli::try_parse_from(["mailcheck-store", "-c", "/srv/cli.yaml", "proxy"]).unwrap();
        std::env::remove_var("MAILCHECK_CONFIG");

        assert_eq!(from_env.config, Some(PathBuf::from("/etc/mailcheck/env.yaml")));
        assert_eq!(explicit.config, Some(PathBuf::from("/srv/cli.yaml")));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["mailcheck-store"]).is_err());
    }
}
