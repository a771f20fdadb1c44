//! Command line interface.
//!
//! Every global option can also come from the environment (and so from `.env`).

use crate::config::{
    Settings, DEFAULT_ASN_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCES_FILE, USER_AGENT,
};
use crate::models::Family;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cloud-ip-lists")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Download cloud provider IP ranges and aggregate them into minimal CIDR lists",
    long_about = None
)]
pub struct Cli {
    /// Source URL list
    #[arg(
        long,
        env = "CLOUD_IP_LISTS_SOURCES",
        default_value = DEFAULT_SOURCES_FILE,
        global = true
    )]
    pub sources: PathBuf,

    /// Output root directory
    #[arg(
        long,
        env = "CLOUD_IP_LISTS_OUTPUT",
        default_value = DEFAULT_OUTPUT_DIR,
        global = true
    )]
    pub output: PathBuf,

    /// ASN to provider map
    #[arg(
        long,
        env = "CLOUD_IP_LISTS_ASN",
        default_value = DEFAULT_ASN_FILE,
        global = true
    )]
    pub asn_config: PathBuf,

    /// User-Agent header sent with every download
    #[arg(
        long,
        env = "CLOUD_IP_LISTS_USER_AGENT",
        default_value = USER_AGENT,
        global = true
    )]
    pub user_agent: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Download every provider document and write source and aggregated lists
    Update,

    /// Aggregate a list file (one CIDR per line) and print the result
    Aggregate {
        /// List file
        file: PathBuf,

        /// Treat every entry as this family instead of detecting it per line
        #[arg(short, long, value_enum)]
        family: Option<Family>,

        /// Print JSON instead of one CIDR per line
        #[arg(long)]
        json: bool,

        /// Skip malformed entries instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Print the CIDR blocks covering an inclusive address range
    Range { start: String, end: String },

    /// Classify an ip2asn TSV table by provider ASN and write the lists
    Ip2asn {
        /// ip2asn-combined.tsv
        tsv: PathBuf,
    },
}

impl Cli {
    /// Run settings resolved from flags, environment and defaults.
    pub fn settings(&self) -> Settings {
        Settings {
            sources_file: self.sources.clone(),
            asn_file: self.asn_config.clone(),
            output_dir: self.output.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_flag() {
        let cli =
            Cli::try_parse_from(["cloud-ip-lists", "update", "--user-agent", "lists-bot/2.0"])
                .unwrap();
        assert_eq!(cli.command, Commands::Update);
        assert_eq!(cli.settings().user_agent, "lists-bot/2.0");
    }

    #[test]
    fn test_global_paths() {
        let cli = Cli::try_parse_from([
            "cloud-ip-lists",
            "--output",
            "/tmp/out",
            "ip2asn",
            "ip2asn-combined.tsv",
            "--asn-config",
            "asn.json",
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.asn_file, PathBuf::from("asn.json"));
        assert_eq!(
            cli.command,
            Commands::Ip2asn {
                tsv: PathBuf::from("ip2asn-combined.tsv")
            }
        );
    }

    #[test]
    fn test_aggregate_flags() {
        let cli = Cli::try_parse_from([
            "cloud-ip-lists",
            "aggregate",
            "list.txt",
            "--family",
            "ipv6",
            "--lenient",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Aggregate {
                file: PathBuf::from("list.txt"),
                family: Some(Family::Ipv6),
                json: false,
                lenient: true,
            }
        );
    }

    #[test]
    fn test_bad_family_rejected() {
        let args = ["cloud-ip-lists", "aggregate", "x", "--family", "ipx"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
