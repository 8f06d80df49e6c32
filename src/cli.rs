use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "asset-portal")]
#[command(about = "Asset portal client - sessions and resource requests from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (falls back to PORTAL_PASSWORD)
        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the persisted session
    Logout,

    /// Show the currently logged-in user
    Whoami,

    /// Register a new account (does not log in)
    Register(RegisterArgs),

    /// Submit a resource request
    Request {
        #[command(subcommand)]
        kind: RequestCommand,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub employee_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Request a device
    Device {
        #[arg(long)]
        device_type: Option<String>,
        #[command(flatten)]
        common: RequestArgs,
    },

    /// Request a software license
    License {
        #[arg(long)]
        software_name: Option<String>,
        #[command(flatten)]
        common: RequestArgs,
    },
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[arg(long, default_value = "")]
    pub purpose: String,

    /// Business justification
    #[arg(long, default_value = "")]
    pub justification: String,

    /// First day the resource is needed (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day the resource is needed (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_license_request() {
        let cli = Cli::try_parse_from([
            "asset-portal",
            "request",
            "license",
            "--software-name",
            "Office",
            "--purpose",
            "x",
            "--justification",
            "y",
            "--start-date",
            "2024-01-01",
        ])
        .unwrap();

        match cli.command {
            Commands::Request {
                kind: RequestCommand::License {
                    software_name,
                    common,
                },
            } => {
                assert_eq!(software_name.as_deref(), Some("Office"));
                assert_eq!(common.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(common.end_date, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_date_rejected() {
        let result = Cli::try_parse_from([
            "asset-portal",
            "request",
            "device",
            "--start-date",
            "01/02/2024",
        ]);
        assert!(result.is_err());
    }
}
