//! jetdrop CLI - Command-line tool for running token airdrops
//!
//! This tool provides commands for:
//! - Validating recipient lists
//! - Building commitment structures and roots
//! - Generating and verifying inclusion proofs
//! - Claiming an allocation through a helper account
//! - Dispatching transfers in batched or sequential mode

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use jetdrop_claim::{ClaimConfig, ClaimCoordinator};
use jetdrop_client::{ChainReader, HttpWalletBridge, NetworkConfig, RpcClient};
use jetdrop_commitment::{
    CommitmentBuilder, CommitmentRoot, CommitmentStructure, ProofFormat, deserialize_proof,
    generate_proof, serialize_proof, verify_for_claimant, verify_proof,
};
use jetdrop_dispatch::{
    BatchDispatcher, DispatchConfig, DispatchDecision, DispatchSession, JobFailure, TransferJob,
};
use jetdrop_primitives::{Address, AmountFormat, EntrySet, RecipientRecord};

/// How amounts in the recipients file are written.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AmountInput {
    /// Raw minimal-unit integers, e.g. "1500000000"
    Nano,
    /// Decimal token amounts, e.g. "1.5"
    Decimal,
}

impl From<AmountInput> for AmountFormat {
    fn from(input: AmountInput) -> Self {
        match input {
            AmountInput::Nano => AmountFormat::Nano,
            AmountInput::Decimal => AmountFormat::Decimal,
        }
    }
}

/// Proof serialization format for files.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProofEncoding {
    Base64,
    Binary,
    Json,
}

impl From<ProofEncoding> for ProofFormat {
    fn from(encoding: ProofEncoding) -> Self {
        match encoding {
            ProofEncoding::Base64 => ProofFormat::Base64,
            ProofEncoding::Binary => ProofFormat::Binary,
            ProofEncoding::Json => ProofFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DispatchMode {
    /// Bundle several transfers per transaction through a wallet session
    Batch,
    /// One transfer per transaction through a signing collaborator
    Sequential,
}

/// jetdrop - fungible-token airdrop engine
#[derive(Parser)]
#[command(name = "jetdrop")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build commitments, prove inclusion, claim and dispatch token airdrops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a recipients file and report every issue
    Validate {
        /// Path to the recipients JSON file
        recipients: PathBuf,

        /// Amount format used in the file
        #[arg(short, long, value_enum, default_value = "nano")]
        format: AmountInput,
    },

    /// Build the commitment structure and root for a recipients file
    Commit {
        /// Path to the recipients JSON file
        recipients: PathBuf,

        /// Amount format used in the file
        #[arg(short, long, value_enum, default_value = "nano")]
        format: AmountInput,

        /// Output file for the structure blob (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a JSON summary instead of the bare blob
        #[arg(long)]
        json: bool,
    },

    /// Inspect a commitment structure blob
    Inspect {
        /// Path to the structure blob file
        structure: PathBuf,

        /// List every entry instead of just the summary
        #[arg(long)]
        entries: bool,
    },

    /// Generate an inclusion proof for one entry
    Prove {
        /// Path to the structure blob file
        structure: PathBuf,

        /// Entry index to prove
        #[arg(short, long)]
        index: Option<u32>,

        /// Claimant address to prove (alternative to --index)
        #[arg(short, long)]
        claimant: Option<String>,

        /// Proof output format
        #[arg(short, long, value_enum, default_value = "base64")]
        format: ProofEncoding,

        /// Output file for the proof (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify an inclusion proof against a commitment root
    Verify {
        /// Path to the proof file
        #[arg(short = 'f', long)]
        proof: PathBuf,

        /// Commitment root in hex
        #[arg(short, long)]
        root: String,

        /// Proof file format
        #[arg(long, value_enum, default_value = "base64")]
        format: ProofEncoding,

        /// Require the proof to belong to this claimant address
        #[arg(short, long)]
        claimant: Option<String>,
    },

    /// Claim an allocation through a deployed helper account
    Claim {
        /// Path to the structure blob file
        structure: PathBuf,

        /// Trusted commitment root in hex
        #[arg(short, long)]
        root: String,

        /// Claimant address
        #[arg(short, long)]
        claimant: String,

        /// Airdrop contract address
        #[arg(short, long)]
        airdrop: String,

        /// Base URL of the wallet bridge
        #[arg(short, long)]
        bridge: String,

        /// Seconds to wait between helper deployment and the claim
        #[arg(long, default_value = "7")]
        wait: u64,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Dispatch transfers for a recipients file
    Dispatch {
        /// Path to the recipients JSON file
        recipients: PathBuf,

        /// Amount format used in the file
        #[arg(short, long, value_enum, default_value = "nano")]
        format: AmountInput,

        /// Dispatch mode
        #[arg(short, long, value_enum, default_value = "batch")]
        mode: DispatchMode,

        /// Sender wallet address (the airdrop treasury)
        #[arg(short, long)]
        sender: String,

        /// Token registry (minter) contract address
        #[arg(long)]
        registry: String,

        /// Base URL of the wallet bridge
        #[arg(short, long)]
        bridge: String,

        /// Transfers per transaction in batch mode
        #[arg(long, default_value = "4")]
        batch_size: usize,

        /// Seconds to pause after each sequential send
        #[arg(long, default_value = "5")]
        cooldown: u64,

        /// Continue past failed jobs without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Write the full dispatch report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        network: NetworkArgs,
    },
}

/// RPC endpoint selection shared by the network commands.
#[derive(Debug, clap::Args)]
struct NetworkArgs {
    /// Explicit RPC endpoint; repeat for fallbacks
    #[arg(short, long)]
    endpoint: Vec<String>,

    /// Use the default testnet endpoints
    #[arg(long)]
    testnet: bool,

    /// API key sent with every RPC request
    #[arg(long)]
    api_key: Option<String>,
}

impl NetworkArgs {
    fn to_config(&self) -> NetworkConfig {
        let mut config = if !self.endpoint.is_empty() {
            NetworkConfig {
                endpoints: self.endpoint.clone(),
                ..NetworkConfig::default()
            }
        } else if self.testnet {
            NetworkConfig::testnet()
        } else {
            NetworkConfig::mainnet()
        };
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { recipients, format } => validate(&recipients, format),

        Commands::Commit {
            recipients,
            format,
            output,
            json,
        } => commit(&recipients, format, output, json),

        Commands::Inspect { structure, entries } => inspect(&structure, entries),

        Commands::Prove {
            structure,
            index,
            claimant,
            format,
            output,
        } => prove(&structure, index, claimant, format, output),

        Commands::Verify {
            proof,
            root,
            format,
            claimant,
        } => verify(&proof, &root, format, claimant),

        Commands::Claim {
            structure,
            root,
            claimant,
            airdrop,
            bridge,
            wait,
            network,
        } => claim(&structure, &root, &claimant, &airdrop, &bridge, wait, &network).await,

        Commands::Dispatch {
            recipients,
            format,
            mode,
            sender,
            registry,
            bridge,
            batch_size,
            cooldown,
            yes,
            report,
            network,
        } => {
            dispatch(
                &recipients,
                format,
                mode,
                &sender,
                &registry,
                &bridge,
                batch_size,
                cooldown,
                yes,
                report,
                &network,
            )
            .await
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_records(path: &Path) -> Result<Vec<RecipientRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipients file: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| "Failed to parse recipients JSON")
}

fn load_entries(path: &Path, format: AmountInput) -> Result<EntrySet> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipients file: {}", path.display()))?;
    EntrySet::parse_json(&contents, format.into())
        .map_err(|e| anyhow!("Recipients file is not usable: {}", e))
}

fn load_structure(path: &Path) -> Result<CommitmentStructure> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read structure file: {}", path.display()))?;
    CommitmentStructure::from_base64(contents.trim())
        .map_err(|e| anyhow!("Structure blob is not usable: {}", e))
}

fn parse_address(input: &str, what: &str) -> Result<Address> {
    input
        .parse()
        .map_err(|e| anyhow!("Invalid {} address '{}': {}", what, input, e))
}

fn validate(recipients: &Path, format: AmountInput) -> Result<()> {
    let records = read_records(recipients)?;
    let report = EntrySet::validate_records(&records, format.into());

    eprintln!("Checked {} records", records.len());
    if report.is_valid() {
        println!("OK");
        return Ok(());
    }

    for issue in &report.issues {
        println!("record {}: {}", issue.index, issue.message);
    }
    eprintln!("{} issue(s) found", report.issues.len());
    std::process::exit(1);
}

fn commit(
    recipients: &Path,
    format: AmountInput,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let entries = load_entries(recipients, format)?;
    let (structure, root) = CommitmentBuilder::build(entries.entries())
        .map_err(|e| anyhow!("Commitment build failed: {}", e))?;

    let total = structure.total_amount();
    eprintln!("Entries: {}", structure.len());
    eprintln!("Total: {} ({} nano)", total, total.nano());
    eprintln!("Root: {}", root);

    let blob = structure.to_base64();
    let rendered = if json {
        serde_json::to_string_pretty(&serde_json::json!({
            "root": root.to_hex(),
            "entries": structure.len(),
            "totalNano": total.nano().to_string(),
            "structureB64": blob,
        }))?
    } else {
        blob
    };

    if let Some(path) = output {
        fs::write(&path, &rendered)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        eprintln!("Structure written to: {}", path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn inspect(structure_path: &Path, list_entries: bool) -> Result<()> {
    let structure = load_structure(structure_path)?;
    let total = structure.total_amount();

    println!("Commitment Structure:");
    println!("  Root: {}", structure.root());
    println!("  Entries: {}", structure.len());
    println!("  Total: {} ({} nano)", total, total.nano());

    if list_entries {
        println!();
        for (index, entry) in structure.iter() {
            println!("  [{}] {} {}", index, entry.address, entry.amount);
        }
    }

    Ok(())
}

fn prove(
    structure_path: &Path,
    index: Option<u32>,
    claimant: Option<String>,
    format: ProofEncoding,
    output: Option<PathBuf>,
) -> Result<()> {
    let structure = load_structure(structure_path)?;

    let index = match (index, claimant) {
        (Some(index), None) => index,
        (None, Some(claimant)) => {
            let address = parse_address(&claimant, "claimant")?;
            structure
                .find_entry_for(&address)
                .map(|(index, _)| index)
                .ok_or_else(|| anyhow!("Address {} is not part of this commitment", address))?
        }
        _ => bail!("Provide exactly one of --index or --claimant"),
    };

    let proof = generate_proof(&structure, index)
        .map_err(|e| anyhow!("Proof generation failed: {}", e))?;
    let root = structure.root();

    eprintln!("Index: {}", proof.index);
    eprintln!("Recipient: {}", proof.entry.address);
    eprintln!("Amount: {}", proof.entry.amount);
    eprintln!("Root: {}", root);

    let data = serialize_proof(&proof, format.into(), Some(&root))
        .map_err(|e| anyhow!("Proof serialization failed: {}", e))?;

    if let Some(path) = output {
        fs::write(&path, &data)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        eprintln!("Proof written to: {}", path.display());
    } else if matches!(format, ProofEncoding::Binary) {
        io::stdout().write_all(&data)?;
    } else {
        println!("{}", String::from_utf8_lossy(&data));
    }

    Ok(())
}

fn verify(
    proof_path: &Path,
    root_hex: &str,
    format: ProofEncoding,
    claimant: Option<String>,
) -> Result<()> {
    let root = CommitmentRoot::from_hex(root_hex).map_err(|e| anyhow!("Bad root: {}", e))?;
    let data = fs::read(proof_path)
        .with_context(|| format!("Failed to read proof file: {}", proof_path.display()))?;
    let proof = deserialize_proof(&data, format.into())
        .map_err(|e| anyhow!("Proof file is not usable: {}", e))?;

    eprintln!("Index: {}", proof.index);
    eprintln!("Recipient: {}", proof.entry.address);
    eprintln!("Amount: {}", proof.entry.amount);

    let valid = match claimant {
        Some(claimant) => {
            let address = parse_address(&claimant, "claimant")?;
            verify_for_claimant(&root, &proof, &address)
        }
        None => verify_proof(&root, &proof),
    };

    if valid {
        println!("VALID");
        Ok(())
    } else {
        println!("INVALID");
        std::process::exit(1);
    }
}

async fn claim(
    structure_path: &Path,
    root_hex: &str,
    claimant: &str,
    airdrop: &str,
    bridge_url: &str,
    wait: u64,
    network: &NetworkArgs,
) -> Result<()> {
    let structure = load_structure(structure_path)?;
    let root = CommitmentRoot::from_hex(root_hex).map_err(|e| anyhow!("Bad root: {}", e))?;
    let claimant = parse_address(claimant, "claimant")?;
    let airdrop = parse_address(airdrop, "airdrop")?;

    let client = RpcClient::new(&network.to_config())
        .map_err(|e| anyhow!("RPC client setup failed: {}", e))?;
    match client.deployment_state(&airdrop).await {
        Ok(state) if !state.is_active() => {
            bail!("Airdrop contract {} is not active on-chain", airdrop)
        }
        Ok(_) => {}
        Err(e) => eprintln!("Warning: could not check airdrop state: {}", e),
    }

    let bridge = HttpWalletBridge::new(bridge_url)
        .map_err(|e| anyhow!("Wallet bridge setup failed: {}", e))?;
    let config = ClaimConfig {
        confirmation_delay: Duration::from_secs(wait),
        ..ClaimConfig::default()
    };
    let mut coordinator = ClaimCoordinator::new(&bridge, config, airdrop, claimant, root);

    eprintln!("Claimant: {}", claimant);
    eprintln!("Airdrop: {}", airdrop);
    eprintln!("Root: {}", root);

    let amount = coordinator
        .run(&structure)
        .await
        .map_err(|e| anyhow!("Claim failed in state {}: {}", coordinator.state(), e))?;

    println!("Claimed {}", amount);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn dispatch(
    recipients: &Path,
    format: AmountInput,
    mode: DispatchMode,
    sender: &str,
    registry: &str,
    bridge_url: &str,
    batch_size: usize,
    cooldown: u64,
    yes: bool,
    report_path: Option<PathBuf>,
    network: &NetworkArgs,
) -> Result<()> {
    let entries = load_entries(recipients, format)?;
    let sender = parse_address(sender, "sender")?;
    let registry = parse_address(registry, "registry")?;

    let client = RpcClient::new(&network.to_config())
        .map_err(|e| anyhow!("RPC client setup failed: {}", e))?;
    let bridge = HttpWalletBridge::new(bridge_url)
        .map_err(|e| anyhow!("Wallet bridge setup failed: {}", e))?;

    let jobs = TransferJob::from_entry_set(&entries);
    let (config, mut session) = match mode {
        DispatchMode::Batch => {
            let config = DispatchConfig {
                batch_size,
                ..DispatchConfig::default()
            };
            let session = DispatchSession::new(jobs, batch_size)
                .map_err(|e| anyhow!("Session setup failed: {}", e))?;
            (config, session)
        }
        DispatchMode::Sequential => {
            let config = DispatchConfig {
                job_cooldown: Duration::from_secs(cooldown),
                ..DispatchConfig::sequential()
            };
            let session = DispatchSession::sequential(jobs)
                .map_err(|e| anyhow!("Session setup failed: {}", e))?;
            (config, session)
        }
    };

    eprintln!("Session: {}", session.id());
    eprintln!("Jobs: {} in {} batch(es)", session.job_count(), session.batch_count());
    eprintln!("Sender: {}", sender);

    let progress = session.progress();
    let dispatcher = BatchDispatcher::new(&client, &client, &bridge, config);
    let mut decide = |failure: &JobFailure<'_>| {
        eprintln!(
            "Batch {}: transfer to {} failed after {} attempt(s): {}",
            failure.batch_number, failure.recipient, failure.attempts, failure.error
        );
        if yes {
            eprintln!("Continuing with the remaining transfers");
            DispatchDecision::Continue
        } else {
            prompt_continue()
        }
    };

    let report = match mode {
        DispatchMode::Batch => {
            dispatcher
                .dispatch_batched(&mut session, &sender, &registry, &mut decide)
                .await
        }
        DispatchMode::Sequential => {
            dispatcher
                .dispatch_sequential(&mut session, &sender, &registry, &mut decide)
                .await
        }
    }
    .map_err(|e| anyhow!("Dispatch failed: {}", e))?;

    let (completed, total) = progress.snapshot();
    eprintln!();
    eprintln!("Progress: {} / {} completed", completed, total);
    println!("Outcome: {:?}", report.outcome);
    println!(
        "Confirmed: {}  Failed: {}  Skipped: {}",
        report.confirmed, report.failed, report.skipped
    );
    for job in report.unsettled() {
        println!(
            "  {} {} -> {:?}{}",
            job.recipient,
            job.amount,
            job.state,
            job.error
                .as_deref()
                .map(|e| format!(" ({})", e))
                .unwrap_or_default()
        );
    }

    if let Some(path) = report_path {
        fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;
        eprintln!("Report written to: {}", path.display());
    }

    if report.is_complete() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn prompt_continue() -> DispatchDecision {
    eprint!("Continue with the remaining transfers? [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return DispatchDecision::Abort;
    }
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => DispatchDecision::Continue,
        _ => DispatchDecision::Abort,
    }
}
