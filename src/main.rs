mod config;
mod error;
mod layout;
mod payload;
mod pdf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use config::{default_output_path, load_profile_record, load_template, write_output};
use error::CertificateError;
use payload::{format_date, format_time};
use pdf::generate_certificate;

const REASONS_HELP: &str = "Possible reasons:
  - travail
  - courses
  - sante
  - famille
  - sport
  - judiciaire
  - missions

Several reasons can be combined in one argument, e.g. \"travail,courses\".";

/// Fill the travel certificate template with a profile and reasons for going out.
#[derive(Parser, Debug)]
#[command(name = "travel_certificate", version)]
#[command(about = "Fill the travel certificate template and add its verification QR code.", long_about = None)]
#[command(after_help = REASONS_HELP)]
struct Args {
    /// Reasons for going out
    reasons: String,

    /// Going out time, format: HHhMM (default: now)
    #[arg(long)]
    time: Option<String>,

    /// Going out date, format: dd/mm/yyyy (default: today)
    #[arg(long)]
    date: Option<String>,

    /// The path to the profile file
    #[arg(long, default_value = "profile.json")]
    profile: PathBuf,

    /// The output path of the certificate
    /// (default: certificate-<lastname>-<time>-<reasons>.pdf)
    #[arg(long)]
    output: Option<PathBuf>,

    /// The certificate template
    #[arg(long, default_value = "data/certificate.pdf")]
    template: PathBuf,
}

fn run(args: Args) -> Result<PathBuf> {
    let now = Local::now().naive_local();
    let outing_date = args.date.unwrap_or_else(|| format_date(&now));
    let outing_time = args.time.unwrap_or_else(|| format_time(&now));

    info!("Loading profile from {:?}...", args.profile);
    let profile = load_profile_record(&args.profile)?
        .into_profile(outing_date, &outing_time)
        .with_context(|| format!("Invalid profile {:?}", args.profile))?;

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&profile.lastname, &outing_time, &args.reasons));

    info!("Loading template from {:?}...", args.template);
    let template = load_template(&args.template)?;

    info!("Generating certificate...");
    let certificate = generate_certificate(&template, &profile, &args.reasons)?;
    debug!("QR payload: {}", certificate.payload);

    write_output(&output_path, &certificate.document)?;
    Ok(output_path)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CertificateError>()
        .map(CertificateError::exit_code)
        .unwrap_or(1)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(output_path) => {
            println!("The certificate is ready: {}", output_path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("Caused by: {}", cause);
            }
            std::process::exit(exit_code(&e));
        }
    }
}
