use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use k256::ecdsa::SigningKey;
use quorum_exec_core::SignatureVerifier;
use quorum_exec_encoder::{
    signer::{parse_private_key, sign_digest, signer_address, K256Recovery},
    types::RequestFile,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rebuild and sign the digests the quorum contracts verify.
///
/// Request files are JSON (`{"kind": "batch", ...}` or `{"kind": "swap", ...}`) and must carry
/// the nonce snapshot read from the contract, so the signature only authorises that exact state.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the struct preimage, struct hash, domain separator and digest of a request.
    Digest {
        #[arg(long)]
        request: PathBuf,
    },
    /// Sign a request's digest.
    Sign {
        #[arg(long)]
        request: PathBuf,

        /// Path to a file containing the signer private key.
        #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
        private_key_path: Option<PathBuf>,

        /// Private key (hex string, 0x...).
        #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
        private_key: Option<String>,
    },
    /// Recover the signer of a signature over a request's digest.
    Recover {
        #[arg(long)]
        request: PathBuf,

        /// Signature (hex, r || s || v).
        #[arg(long)]
        signature: String,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Digest { request } => {
            let file = load_request(&request)?;
            let out = json!({
                "preimage": format!("0x{}", hex::encode(file.preimage()?)),
                "structHash": file.struct_hash()?,
                "domainSeparator": file.domain().separator(),
                "digest": file.digest()?,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Sign {
            request,
            private_key_path,
            private_key,
        } => {
            let file = load_request(&request)?;
            let key = load_key(private_key_path, private_key)?;
            let digest = file.digest()?;
            let signature = sign_digest(&key, digest).map_err(|e| anyhow!("signing failed: {e}"))?;
            info!(signer = %signer_address(&key), %digest, "signed request");
            let out = json!({
                "signer": signer_address(&key),
                "digest": digest,
                "signature": format!("0x{}", hex::encode(signature)),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Recover { request, signature } => {
            let file = load_request(&request)?;
            let digest = file.digest()?;
            let raw = signature.trim();
            let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
                .context("signature is not valid hex")?;
            let recovered = K256Recovery
                .recover(digest, &bytes)
                .map_err(|e| anyhow!("could not recover signer: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&json!({ "signer": recovered, "digest": digest }))?);
        }
    }
    Ok(())
}

fn load_request(path: &PathBuf) -> Result<RequestFile> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed parsing request JSON in {}", path.display()))
}

fn load_key(path: Option<PathBuf>, inline: Option<String>) -> Result<SigningKey> {
    if let Some(path) = path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading key file {}", path.display()))?;
        return parse_private_key(&raw);
    }
    if let Some(raw) = inline {
        return parse_private_key(&raw);
    }
    Err(anyhow!(
        "missing signer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
    ))
}
