//! TSS Node CLI
//!
//! Command-line harness for threshold participants:
//! - Simulate a full DKG and signing round with every participant in-process
//! - Combine partial signatures supplied on the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use k256::Scalar;
use tss_core::{
    group::decode_scalar, keygen, mpc::MemoryRelay, sign, AggregateSignature, GroupParams,
    MessageDigest, ParticipantId, SessionConfig, SessionId, ShareCheck, SignatureShare,
};

/// TSS Node - threshold participant harness
#[derive(Parser)]
#[command(name = "tss-node")]
#[command(about = "Threshold DKG and signing participant harness")]
#[command(version)]
struct Cli {
    /// Threshold (polynomial degree + 1)
    #[arg(short, long, env = "THRESHOLD", default_value_t = tss_core::DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Total number of participants
    #[arg(short = 'n', long, env = "TOTAL_PARTICIPANTS", default_value_t = tss_core::DEFAULT_PARTICIPANTS)]
    participants: u32,

    /// Share verification algorithm (feldman | interpolated)
    #[arg(long, env = "SHARE_CHECK", default_value_t = ShareCheck::Feldman)]
    share_check: ShareCheck,

    /// Message digest (keccak256 | sha256)
    #[arg(long, env = "MESSAGE_DIGEST", default_value_t = MessageDigest::Keccak256)]
    digest: MessageDigest,

    /// Seconds to wait for peer messages before giving up
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run DKG for every participant, then sign with the chosen signers
    Simulate {
        /// Message to sign
        #[arg(short, long, default_value = "Hello, Threshold Signature!")]
        message: String,

        /// Participating signer IDs (comma-separated, 1-based)
        #[arg(short, long, value_delimiter = ',', default_value = "1,2")]
        signers: Vec<ParticipantId>,
    },

    /// Combine partial signatures given as `r:s` hex pairs
    Combine {
        /// Partial signatures; the first one supplies r
        #[arg(required = true)]
        shares: Vec<String>,
    },
}

#[derive(Serialize)]
struct SimulationReport {
    threshold: u32,
    participants: u32,
    share_check: String,
    digest: String,
    verification_keys: BTreeMap<ParticipantId, String>,
    signers: Vec<ParticipantId>,
    signature: AggregateSignature,
    rsv: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            ref message,
            ref signers,
        } => {
            run_simulate(&cli, message, signers).await?;
        }
        Commands::Combine { ref shares } => {
            run_combine(shares)?;
        }
    }

    Ok(())
}

async fn run_simulate(cli: &Cli, message: &str, signers: &[ParticipantId]) -> Result<()> {
    info!(
        threshold = cli.threshold,
        participants = cli.participants,
        share_check = %cli.share_check,
        "Starting local simulation"
    );
    if let Some(unknown) = signers
        .iter()
        .find(|id| **id == 0 || **id > cli.participants)
    {
        bail!("Signer {} is not one of the {} participants", unknown, cli.participants);
    }
    if cli.share_check == ShareCheck::Interpolated {
        warn!("Interpolated share check rejects shares dealt from independent polynomials");
    }

    let params = GroupParams::secp256k1();
    let relay = Arc::new(MemoryRelay::new().with_timeout(Duration::from_secs(cli.timeout_secs)));
    let dkg_session: SessionId = rand::random();
    let sign_session: SessionId = rand::random();

    let configs = (1..=cli.participants)
        .map(|party_id| {
            Ok(
                SessionConfig::new(dkg_session, cli.threshold, cli.participants, party_id)?
                    .with_share_check(cli.share_check)
                    .with_digest(cli.digest),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let outputs = try_join_all(
        configs
            .iter()
            .map(|config| keygen::run_dkg(&params, config, relay.as_ref())),
    )
    .await
    .context("DKG round failed")?;

    for output in &outputs {
        info!(
            party_id = output.key_share.party_id(),
            verification_key = %params.encode_point(output.key_share.verification_key()),
            "Key share ready"
        );
    }

    let signatures = try_join_all(
        configs
            .iter()
            .zip(&outputs)
            .filter(|(config, _)| signers.contains(&config.party_id))
            .map(|(config, output)| {
                sign::run_dsg(
                    &params,
                    config,
                    output,
                    &sign_session,
                    message.as_bytes(),
                    signers,
                    relay.as_ref(),
                )
            }),
    )
    .await
    .context("Signing round failed")?;

    let Some(signature) = signatures.into_iter().next() else {
        bail!("No signer belongs to the participant set");
    };
    let rsv = signature.to_bytes()?;

    let report = SimulationReport {
        threshold: cli.threshold,
        participants: cli.participants,
        share_check: cli.share_check.to_string(),
        digest: cli.digest.to_string(),
        verification_keys: outputs[0].verification_keys.clone(),
        signers: signers.to_vec(),
        signature,
        rsv: hex::encode(rsv),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn run_combine(encoded: &[String]) -> Result<()> {
    let shares = encoded
        .iter()
        .map(|pair| {
            let (r, s) = pair
                .split_once(':')
                .with_context(|| format!("expected r:s, got {}", pair))?;
            Ok(SignatureShare {
                r: parse_scalar(r)?,
                s: parse_scalar(s)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let signature = sign::combine(&shares)?;
    info!(count = shares.len(), "Combined partial signatures");

    println!("{}", serde_json::to_string_pretty(&signature)?);

    Ok(())
}

/// Decode a hex scalar, left-padding short values to 32 bytes
fn parse_scalar(encoded: &str) -> Result<Scalar> {
    let encoded = encoded.trim_start_matches("0x");
    if encoded.len() > 64 {
        bail!("scalar {} is longer than 32 bytes", encoded);
    }
    Ok(decode_scalar(&format!("{:0>64}", encoded))?)
}
