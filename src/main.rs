use std::fs;
use std::process::exit;

use chrono::Utc;
use clap::Parser;
use log::{debug, info};

use certinfo::config::Config;
use certinfo::output::{render, CertificateReport};
use certinfo::extract_certificate_info;

const DEFAULT_CONFIG_FILE: &str = "certinfo.toml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PEM certificate files to inspect
    files: Vec<String>,

    /// Output format: text, json or summary
    #[arg(short, long)]
    output: Option<String>,

    /// Exit code when a certificate is expired or cannot be read
    #[arg(long)]
    exit_code: Option<i32>,

    /// Configuration file (defaults to ./certinfo.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,

    /// Log filter, e.g. "debug" or "certinfo=trace"
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.generate_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    let file_config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("Failed to load config {}: {}", path, err);
                exit(1);
            }
        },
        None => Config::from_file(DEFAULT_CONFIG_FILE).ok(),
    };

    let files = if cli.files.is_empty() {
        None
    } else {
        Some(cli.files)
    };
    let cli_config = Config::from_cli_args(files, cli.output, cli.exit_code, cli.log_level);

    let mut config = Config::default();
    if let Some(file_config) = file_config {
        config = config.merge_with(file_config);
    }
    let config = config.merge_with(cli_config);

    init_logging(config.log_level.as_deref().unwrap_or("warn"));

    let format = match config.output_format() {
        Ok(format) => format,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    let files = match &config.files {
        Some(files) if !files.is_empty() => files.clone(),
        _ => {
            eprintln!("No certificate files given. Pass files as arguments or list them in the config file.");
            exit(1);
        }
    };

    let now = Utc::now();
    let mut reports = Vec::with_capacity(files.len());
    let mut problems = 0;

    for path in files {
        debug!("reading certificate from {}", path);
        let pem = match fs::read_to_string(&path) {
            Ok(pem) => pem,
            Err(err) => {
                eprintln!("Fail to read file: {}  {}", path, err);
                problems += 1;
                continue;
            }
        };

        match extract_certificate_info(&pem) {
            Ok(info) => {
                if info.is_expired_at(now) {
                    info!("{} expired at {}", path, info.not_after);
                    problems += 1;
                }
                reports.push(CertificateReport { source: path, info });
            }
            Err(err) => {
                eprintln!("Fail to parse certificate: {}  {}", path, err);
                problems += 1;
            }
        }
    }

    match render(&reports, format, now) {
        Ok(rendered) => println!("{}", rendered),
        Err(err) => {
            eprintln!("Failed to render output: {}", err);
            exit(1);
        }
    }

    if problems > 0 {
        exit(config.exit_code.unwrap_or(0));
    }
    exit(0);
}

fn init_logging(default_filter: &str) {
    env_logger::Builder::new()
        .parse_filters(default_filter)
        .parse_default_env()
        .format_timestamp_micros()
        .init();
}
