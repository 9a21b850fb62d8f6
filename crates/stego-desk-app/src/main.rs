#![warn(missing_docs)]
//! # stego-desk-app binary
//!
//! Command-line shell for stego-desk. Each subcommand builds a session,
//! drives it through the orchestration layer, and reports the settled
//! outcome on stdout/stderr with `timestamp | LEVEL | stage | action |
//! detail` run logging on stderr. Encode and decode take `--json` to
//! report the settled outcome as one JSON object on stdout instead.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stego_desk_app::{
    APP_VERSION, AppError, DiskDownloadSink, Session, SubmissionOrchestrator, SubmitDisposition,
    app_version, config_from_env, load_image_asset, media_type_for_path, probe_service,
    redact_sensitive, refresh_capacity,
};
use stego_desk_client::{HttpTransport, StegoClient, asset_digest};
use stego_desk_core::Mode;
use stego_desk_ui::{CapacityDisplay, asset_info_label, result_view, strength_indicator};
use time::OffsetDateTime;

/// Command line interface for the stego-desk client.
#[derive(Debug, Parser)]
#[command(name = "stego-desk", version = APP_VERSION, about = "PNG steganography desk client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Top-level operations.
#[derive(Debug, Subcommand)]
enum Command {
    /// Hide a message inside a PNG and download the encoded copy.
    Encode {
        /// PNG file to carry the message.
        #[arg(long)]
        image: PathBuf,
        /// Encryption key protecting the message.
        #[arg(long)]
        key: String,
        /// Message text to hide.
        #[arg(long)]
        message: String,
        /// Print the settled outcome as a JSON object on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Recover a hidden message from an encoded PNG.
    Decode {
        /// Encoded PNG file.
        #[arg(long)]
        image: PathBuf,
        /// Decryption key for the hidden message.
        #[arg(long)]
        key: String,
        /// Print the settled outcome as a JSON object on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Report the approximate message capacity of a PNG.
    Capacity {
        /// PNG file to probe.
        #[arg(long)]
        image: PathBuf,
    },
    /// Check that the stego service is reachable.
    Ping,
}

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            log_error("shell", "run", &redact_sensitive(&error.to_string()));
            eprintln!("stego-desk: {error}");
            ExitCode::from(2)
        }
    }
}

/// Runs one subcommand. `Ok(true)` means the operation succeeded, `Ok(false)`
/// that it settled with a failure outcome; `Err` is a shell-level failure.
fn run(command: Command) -> Result<bool, AppError> {
    let config = config_from_env()?;
    let transport = Arc::new(HttpTransport::new(None)?);
    let client = StegoClient::new(&config.endpoint, transport)?;
    log_info(
        "shell",
        "startup",
        &format!("version={} endpoint={}", app_version(), client.endpoint()),
    );

    match command {
        Command::Encode {
            image,
            key,
            message,
            json,
        } => {
            let mut session = Session::new(Mode::Encode);
            if !attach_image(&client, &mut session, &image, json)? {
                return print_outcome(&session, json);
            }

            session.set_key(&key);
            if let Some(strength) = session.key_strength() {
                log_info(
                    "form",
                    "strength_scored",
                    &format!("label={}", strength_indicator(strength).label),
                );
            }

            session.set_message(&message);
            let counter = session.counter();
            if !json && !counter.text.is_empty() {
                println!("{}", counter.text);
                if counter.over_capacity {
                    eprintln!("Warning: message is longer than the estimated image capacity.");
                }
            }

            let sink = Arc::new(DiskDownloadSink::new(config.download_dir));
            let orchestrator = SubmissionOrchestrator::new(client, sink);
            submit_and_report(&orchestrator, &mut session, json)
        }
        Command::Decode { image, key, json } => {
            let mut session = Session::new(Mode::Decode);
            if !attach_image(&client, &mut session, &image, json)? {
                return print_outcome(&session, json);
            }

            session.set_key(&key);
            let sink = Arc::new(DiskDownloadSink::new(config.download_dir));
            let orchestrator = SubmissionOrchestrator::new(client, sink);
            submit_and_report(&orchestrator, &mut session, json)
        }
        Command::Capacity { image } => {
            let asset = load_image_asset(&image)?;
            log_info(
                "capacity",
                "probe",
                &format!(
                    "file={} digest={}",
                    asset_info_label(&asset),
                    asset_digest(&asset)
                ),
            );

            match client.check_capacity(&asset) {
                Ok(bound) => {
                    println!("{}", CapacityDisplay::Known(bound).text());
                    Ok(true)
                }
                Err(error) => {
                    log_error("capacity", "probe_failed", &error.to_string());
                    eprintln!("{}", CapacityDisplay::Unavailable.text());
                    Ok(false)
                }
            }
        }
        Command::Ping => match probe_service(&client) {
            Ok(status) => {
                println!(
                    "{}",
                    status
                        .message
                        .unwrap_or_else(|| "Service is reachable.".to_string())
                );
                Ok(true)
            }
            Err(error) => {
                log_error("probe", "status_failed", &error.to_string());
                eprintln!("Service is unreachable: {error}");
                Ok(false)
            }
        },
    }
}

/// Reads a file from disk and attaches it to the session, probing capacity
/// in encode mode. `Ok(false)` means the candidate was rejected and the
/// session holds the rejection outcome. `quiet` keeps the capacity line off
/// stdout so JSON output stays the only stdout artifact.
fn attach_image(
    client: &StegoClient,
    session: &mut Session,
    path: &Path,
    quiet: bool,
) -> Result<bool, AppError> {
    let bytes = std::fs::read(path).map_err(|error| {
        AppError::Artifact(format!("unable to read '{}': {error}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    match session.select_image(file_name, media_type_for_path(path), bytes) {
        Ok(capacity_token) => {
            if let Some(asset) = session.image() {
                log_info(
                    "form",
                    "attachment_accepted",
                    &format!(
                        "file={} digest={}",
                        asset_info_label(asset),
                        asset_digest(asset)
                    ),
                );
            }

            if let Some(token) = capacity_token {
                refresh_capacity(client, session, token);
                if !quiet {
                    let line = session.capacity_display().text();
                    if !line.is_empty() {
                        println!("{line}");
                    }
                }
            }
            Ok(true)
        }
        Err(error) => {
            log_error("form", "attachment_rejected", &error.to_string());
            Ok(false)
        }
    }
}

/// Submits the session and prints the settled outcome.
fn submit_and_report(
    orchestrator: &SubmissionOrchestrator,
    session: &mut Session,
    json: bool,
) -> Result<bool, AppError> {
    log_info(
        "submit",
        "dispatch",
        &format!("mode={}", session.mode().as_str()),
    );

    match orchestrator.submit(session) {
        SubmitDisposition::Settled(_) => print_outcome(session, json),
        SubmitDisposition::RefusedBusy => {
            log_error("submit", "refused", "a submission is already dispatched");
            eprintln!("A submission is already in progress.");
            Ok(false)
        }
    }
}

/// Prints the session's settled outcome, through the result projection by
/// default or as one JSON object on stdout when `json` is set.
fn print_outcome(session: &Session, json: bool) -> Result<bool, AppError> {
    let Some(outcome) = session.last_outcome() else {
        return Ok(false);
    };

    if json {
        println!("{}", outcome.to_json_string()?);
    } else {
        let view = result_view(session.mode(), outcome);
        if view.success {
            println!("{}", view.text);
        } else {
            eprintln!("{}", view.text);
        }
    }

    let success = outcome.is_success();
    log_info(
        "result",
        "settled",
        &format!("mode={} success={}", session.mode().as_str(), success),
    );
    Ok(success)
}

fn log_info(stage: &str, action: &str, detail: &str) {
    log_line("INFO", stage, action, detail);
}

fn log_error(stage: &str, action: &str, detail: &str) {
    log_line("ERROR", stage, action, detail);
}

fn log_line(level: &str, stage: &str, action: &str, detail: &str) {
    let timestamp = timestamp_compact_utc();
    eprintln!("{timestamp} | {level} | {stage} | {action} | {detail}");
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
