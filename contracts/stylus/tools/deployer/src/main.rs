use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use quorum_exec_core::EngineConfig;
use regex::Regex;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Deploy one of the quorum contracts with `cargo stylus deploy`, then record it in a
/// deployments JSON.
///
/// Constructor arguments are checked with the same rules the contract applies, so a bad member
/// list or quorum fails here instead of reverting the deployment on-chain.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Which contract to deploy.
    #[arg(long, value_enum, default_value_t = Target::Executor)]
    target: Target,

    /// Directory containing the contract crate. Defaults to the target's crate under `src/`.
    #[arg(long)]
    contract_dir: Option<PathBuf>,

    /// RPC URL used by `cargo stylus deploy`.
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Path to a file containing the deployer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<String>,

    /// Private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,

    /// Signing domain name baked into every digest.
    #[arg(long, env = "DOMAIN_NAME")]
    domain_name: Option<String>,

    #[arg(long, env = "DOMAIN_VERSION", default_value = "1")]
    domain_version: String,

    /// Executor member (repeat for each member).
    #[arg(long = "member")]
    members: Vec<Address>,

    /// Signatures required per request (executor only).
    #[arg(long, default_value_t = 1)]
    quorum: usize,

    /// Path to write deployment info (eg, deployments.devnet.json).
    #[arg(long, default_value = "deployments.devnet.json")]
    deployments_path: PathBuf,

    /// Key under `deployments` to store this contract. Defaults to the target name.
    #[arg(long)]
    contract_key: Option<String>,

    /// Optional network name (eg, devnet, arb-sepolia).
    #[arg(long, default_value = "devnet")]
    network: String,

    /// Extra args to pass through to `cargo stylus deploy` (after `--`).
    ///
    /// Example:
    /// `-- --estimate-gas`
    #[arg(last = true)]
    passthrough: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Executor,
    Swap,
}

impl Target {
    fn contract_dir(self) -> &'static str {
        match self {
            Target::Executor => "src/quorum-executor",
            Target::Swap => "src/quorum-swap",
        }
    }

    fn contract_key(self) -> &'static str {
        match self {
            Target::Executor => "quorum-executor",
            Target::Swap => "quorum-swap",
        }
    }

    fn default_domain_name(self) -> &'static str {
        match self {
            Target::Executor => "Quorum Executor",
            Target::Swap => "Quorum Swap",
        }
    }
}

/// Resolved deployment plan: where to run and what to pass the constructor.
struct Plan {
    contract_dir: PathBuf,
    contract_key: String,
    constructor_args: Vec<String>,
    constructor: Value,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let plan = plan(&cli)?;
    info!(
        kind = ?cli.target,
        dir = %plan.contract_dir.display(),
        "deploying"
    );

    let (address, tx_hashes, raw_output) = run_cargo_stylus_deploy(&cli, &plan)?;
    write_deployments_json(&cli, &plan, &address, &tx_hashes, &raw_output)?;

    info!(contract = %plan.contract_key, %address, txs = tx_hashes.len(), "deployed");
    println!("Deployed `{}` to {}", plan.contract_key, address);
    Ok(())
}

fn plan(cli: &Cli) -> Result<Plan> {
    let domain_name = cli
        .domain_name
        .clone()
        .unwrap_or_else(|| cli.target.default_domain_name().to_string());

    let (constructor_args, constructor) = match cli.target {
        Target::Executor => {
            let config = EngineConfig {
                domain_name,
                domain_version: cli.domain_version.clone(),
                members: cli.members.clone(),
                quorum: cli.quorum,
            };
            let policy = config
                .validate()
                .map_err(|e| anyhow!("invalid executor configuration: {e}"))?;
            // Stored ascending on-chain; pass them that way so the record matches `members()`.
            let members: Vec<String> = policy.members().map(|m| m.to_string()).collect();
            let args = vec![
                config.domain_name.clone(),
                config.domain_version.clone(),
                format!("[{}]", members.join(",")),
                config.quorum.to_string(),
            ];
            let record = json!({
                "domain_name": config.domain_name,
                "domain_version": config.domain_version,
                "members": members,
                "quorum": config.quorum,
            });
            (args, record)
        }
        Target::Swap => {
            if !cli.members.is_empty() {
                warn!("--member is ignored for the swap contract");
            }
            let args = vec![domain_name.clone(), cli.domain_version.clone()];
            let record = json!({
                "domain_name": domain_name,
                "domain_version": cli.domain_version,
            });
            (args, record)
        }
    };

    Ok(Plan {
        contract_dir: cli
            .contract_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(cli.target.contract_dir())),
        contract_key: cli
            .contract_key
            .clone()
            .unwrap_or_else(|| cli.target.contract_key().to_string()),
        constructor_args,
        constructor,
    })
}

fn run_cargo_stylus_deploy(cli: &Cli, plan: &Plan) -> Result<(String, Vec<String>, String)> {
    // Lines parsed from `cargo stylus deploy` output:
    //   Deploying program to address 0x...
    //   Confirmed tx 0x...
    let re_address = Regex::new(r"Deploying program to address (0x[a-fA-F0-9]{40})")?;
    let re_tx = Regex::new(r"Confirmed tx (0x[a-fA-F0-9]{64})")?;

    let mut cmd = Command::new("cargo");
    cmd.current_dir(&plan.contract_dir);
    cmd.arg("stylus").arg("deploy");
    cmd.arg("-e").arg(&cli.rpc_url);

    if let Some(ref pk_path) = cli.private_key_path {
        cmd.arg("--private-key-path").arg(pk_path);
    } else if let Some(ref pk) = cli.private_key {
        cmd.arg("--private-key").arg(pk);
    } else {
        return Err(anyhow!(
            "missing deployer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
        ));
    }

    cmd.arg("--constructor-args").args(&plan.constructor_args);
    debug!(args = ?plan.constructor_args, "constructor arguments");

    // Keep stdout/stderr for parsing and for debugging when runs fail.
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    // Allow passing flags like --estimate-gas, --mode, etc.
    if !cli.passthrough.is_empty() {
        cmd.args(&cli.passthrough);
    }

    let output = cmd
        .output()
        .context("failed to run `cargo stylus deploy`")?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let combined = format!("{stdout}\n{stderr}");

    if !output.status.success() {
        return Err(anyhow!(
            "`cargo stylus deploy` failed (exit {}):\n{}",
            output.status,
            combined
        ));
    }

    let address = re_address
        .captures_iter(&combined)
        .next()
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
        .ok_or_else(|| {
            anyhow!("could not parse deployed address from `cargo stylus deploy` output")
        })?;

    let tx_hashes: Vec<String> = re_tx
        .captures_iter(&combined)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    Ok((address, tx_hashes, combined))
}

fn write_deployments_json(
    cli: &Cli,
    plan: &Plan,
    address: &str,
    tx_hashes: &[String],
    raw_output: &str,
) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let existing = if cli.deployments_path.exists() {
        fs::read_to_string(&cli.deployments_path)
            .with_context(|| format!("failed reading {}", cli.deployments_path.display()))?
    } else {
        String::new()
    };

    let mut root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", cli.deployments_path.display()))?
    };

    if !root.is_object() {
        root = json!({});
    }

    root["network"] = json!(cli.network);
    root["updated_at"] = json!(now);

    if root.get("deployments").and_then(Value::as_object).is_none() {
        root["deployments"] = json!({});
    }

    let mut entry = json!({
        "address": address,
        "rpc_url": cli.rpc_url,
        "deployed_at": now,
        "constructor": plan.constructor,
    });

    if !tx_hashes.is_empty() {
        entry["tx_hashes"] = json!(tx_hashes);
    }

    // Raw output is kept for audit, truncated to bound the file size.
    let trimmed = raw_output.trim();
    if !trimmed.is_empty() {
        let max = 16_000usize;
        let s = if trimmed.len() > max {
            let mut end = max;
            while !trimmed.is_char_boundary(end) {
                end -= 1;
            }
            &trimmed[..end]
        } else {
            trimmed
        };
        entry["cargo_stylus_output"] = json!(s);
    }

    root["deployments"][&plan.contract_key] = entry;

    write_json_atomic(&cli.deployments_path, &root)?;
    Ok(())
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising deployments JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
