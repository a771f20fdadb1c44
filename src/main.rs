use clap::Parser;
use cloud_ip_lists::cli::{Cli, Commands};
use cloud_ip_lists::config::AsnConfig;
use cloud_ip_lists::models::Family;
use cloud_ip_lists::output::{print_summary, read_list, ListWriter};
use cloud_ip_lists::pipeline::{aggregate_list, process_ip2asn, update_provider_sources, ASN_DIR};
use cloud_ip_lists::range_to_cidr_strings;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::Path;

fn init_logging() -> Result<(), Box<dyn Error>> {
    if Path::new("log4rs.yml").exists() {
        log4rs::init_file("log4rs.yml", Default::default())?;
        return Ok(());
    }
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    init_logging()?;
    log::info!("#Start main()");

    let cli = Cli::parse();
    let settings = cli.settings();

    match cli.command {
        Commands::Update => {
            let summaries = update_provider_sources(&settings).await?;
            print_summary(&summaries);
        }
        Commands::Aggregate {
            file,
            family,
            json,
            lenient,
        } => {
            let entries = read_list(&file)?;
            let result = aggregate_list(&entries, family, lenient)?;
            for rejected in &result.rejected {
                log::warn!("{}: skipping {rejected}", file.display());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for cidr in &result.ipv4 {
                    println!("{cidr}");
                }
                for cidr in &result.ipv6 {
                    println!("{cidr}");
                }
            }
        }
        Commands::Range { start, end } => {
            let family = Family::detect(&start)
                .ok_or_else(|| format!("'{start}' is not an IP address"))?;
            for cidr in range_to_cidr_strings(&start, &end, family)? {
                println!("{cidr}");
            }
        }
        Commands::Ip2asn { tsv } => {
            let config = AsnConfig::load(&settings.asn_file)?;
            let writer = ListWriter::new(settings.output_dir.join(ASN_DIR));
            let summaries = process_ip2asn(&tsv, &config, &writer)?;
            print_summary(&summaries);
        }
    }

    Ok(())
}
