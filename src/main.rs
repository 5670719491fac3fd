//! powallet CLI
//!
//! Command-line front end for the proof-of-work search and the wallet.
//!
//! # Commands
//!
//! - `pow` - Find a nonce for a seed at a difficulty
//! - `new-wallet` - Generate an ephemeral wallet and show its address and key
//! - `demo` - Mine a message, sign the stamped text and verify it
//! - `verify` - Check a signature against a PEM public key file
//! - `benchmark` - Measure the digest rate

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use powallet::miner::DEFAULT_DIFFICULTY;
use powallet::pow::ProofOfWork;
use powallet::{mine, stamp, verify_signature, MinerConfig, PublicKeyPem, Wallet};

#[derive(Parser)]
#[command(name = "powallet")]
#[command(version)]
#[command(about = "Proof-of-work search and secp256k1 wallet toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the smallest nonce whose digest has enough leading zeros
    Pow {
        /// Seed text
        #[arg(short, long)]
        seed: String,

        /// Number of leading zero hex characters
        #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,

        /// Search on N threads (no value: number of CPU cores)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "0")]
        threads: Option<usize>,

        /// Give up after this many nonces
        #[arg(long)]
        max_attempts: Option<u64>,
    },

    /// Generate a new wallet (not saved)
    NewWallet,

    /// Mine a message, append the nonce, sign and verify it
    Demo {
        /// Message to stamp
        #[arg(short, long, default_value = "hello world")]
        message: String,

        /// Number of leading zero hex characters
        #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
    },

    /// Verify a signature
    Verify {
        /// File holding the PEM public key
        #[arg(long)]
        public_key: PathBuf,

        /// The signed message
        #[arg(long)]
        message: String,

        /// Hex signature
        #[arg(long)]
        signature: String,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of digests to compute
        #[arg(short, long, default_value = "100000")]
        count: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pow {
            seed,
            difficulty,
            threads,
            max_attempts,
        } => cmd_pow(&seed, difficulty, threads, max_attempts, cli.json),
        Commands::NewWallet => cmd_new_wallet(cli.json),
        Commands::Demo {
            message,
            difficulty,
        } => cmd_demo(&message, difficulty, cli.json),
        Commands::Verify {
            public_key,
            message,
            signature,
        } => cmd_verify(&public_key, &message, &signature, cli.json),
        Commands::Benchmark { count } => cmd_benchmark(count, cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "powallet=debug" } else { "powallet=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `--threads` without a value means one thread per core
fn resolve_threads(threads: Option<usize>) -> Option<usize> {
    threads.map(|t| if t == 0 { num_cpus::get() } else { t })
}

#[derive(Serialize)]
struct PowReport<'a> {
    seed: &'a str,
    difficulty: u32,
    hash: String,
    nonce: u64,
    elapsed_secs: f64,
}

fn cmd_pow(
    seed: &str,
    difficulty: u32,
    threads: Option<usize>,
    max_attempts: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = MinerConfig {
        difficulty,
        threads: resolve_threads(threads),
        max_attempts,
    };
    info!(difficulty, threads = ?config.threads, "searching");

    let start = Instant::now();
    let proof = mine(seed, &config)?;
    let elapsed = start.elapsed().as_secs_f64();

    let report = PowReport {
        seed,
        difficulty,
        hash: proof.digest_hex(),
        nonce: proof.nonce,
        elapsed_secs: elapsed,
    };

    if json {
        return print_json(&report);
    }

    println!("{} {} {}", report.seed, report.hash, report.nonce);
    println!("Elapsed: {:.6}s", report.elapsed_secs);

    Ok(())
}

#[derive(Serialize)]
struct WalletReport<'a> {
    address: &'a str,
    public_key: &'a str,
}

fn cmd_new_wallet(json: bool) -> anyhow::Result<()> {
    let wallet = Wallet::new()?;
    let report = WalletReport {
        address: wallet.address().as_str(),
        public_key: wallet.public_key().as_str(),
    };

    if json {
        return print_json(&report);
    }

    println!("Address: {}", report.address);
    print!("{}", report.public_key);
    println!("\nThis wallet is not saved anywhere.");

    Ok(())
}

#[derive(Serialize)]
struct DemoReport<'a> {
    address: &'a str,
    public_key: &'a str,
    stamped: &'a powallet::StampedMessage,
    verified: bool,
}

fn cmd_demo(message: &str, difficulty: u32, json: bool) -> anyhow::Result<()> {
    let wallet = Wallet::new()?;
    let stamped = stamp(&wallet, message, &MinerConfig::with_difficulty(difficulty))?;
    let verified = stamped.verify(wallet.public_key())?;

    if json {
        return print_json(&DemoReport {
            address: wallet.address().as_str(),
            public_key: wallet.public_key().as_str(),
            stamped: &stamped,
            verified,
        });
    }

    println!("Address:   {}", wallet.address());
    print!("{}", wallet.public_key());
    println!("Hash:      {}", stamped.proof.digest_hex());
    println!("Nonce:     {}", stamped.proof.nonce);
    println!("Signed:    {}", stamped.signed_text());
    println!("Signature: {}", stamped.signature);
    println!("Verified:  {}", verified);

    Ok(())
}

fn load_public_key(path: &Path) -> anyhow::Result<PublicKeyPem> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key from {}", path.display()))?;
    Ok(PublicKeyPem::parse(&text)?)
}

fn cmd_verify(path: &Path, message: &str, signature: &str, json: bool) -> anyhow::Result<()> {
    let public_key = load_public_key(path)?;
    let verified = verify_signature(&public_key, message, signature)?;

    if json {
        return print_json(&serde_json::json!({ "verified": verified }));
    }

    println!("{}", verified);
    Ok(())
}

fn cmd_benchmark(count: u64, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("Running benchmark with {} digests...", count);
    }

    let pow = ProofOfWork::new(b"benchmark input data for powallet");

    let start = Instant::now();
    for nonce in 0..count {
        std::hint::black_box(pow.digest(nonce));
    }
    let elapsed = start.elapsed().as_secs_f64();
    let hashrate = if elapsed > 0.0 { count as f64 / elapsed } else { 0.0 };

    if json {
        return print_json(&serde_json::json!({
            "count": count,
            "elapsed_secs": elapsed,
            "hashrate": hashrate,
        }));
    }

    println!("\nResults:");
    println!("  Total digests: {}", count);
    println!("  Time elapsed:  {:.2}s", elapsed);
    println!("  Hashrate:      {:.0} H/s", hashrate);
    println!(
        "  Expected attempts at difficulty {}: {}",
        DEFAULT_DIFFICULTY,
        16u64.pow(DEFAULT_DIFFICULTY)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pow_threads() {
        let cli = Cli::try_parse_from(["powallet", "pow", "--seed", "test", "-d", "2", "-t"]).unwrap();
        match cli.command {
            Commands::Pow {
                seed,
                difficulty,
                threads,
                max_attempts,
            } => {
                assert_eq!(seed, "test");
                assert_eq!(difficulty, 2);
                assert_eq!(threads, Some(0));
                assert_eq!(max_attempts, None);
            }
            _ => panic!("expected pow command"),
        }

        let cli = Cli::try_parse_from(["powallet", "pow", "--seed", "x", "--threads", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Pow { threads: Some(3), .. }));
    }

    #[test]
    fn test_resolve_threads() {
        assert_eq!(resolve_threads(None), None);
        assert_eq!(resolve_threads(Some(2)), Some(2));
        assert_eq!(resolve_threads(Some(0)), Some(num_cpus::get()));
    }

    #[test]
    fn test_load_public_key() {
        let wallet = Wallet::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(wallet.public_key().as_bytes()).unwrap();

        let loaded = load_public_key(file.path()).unwrap();
        assert_eq!(&loaded, wallet.public_key());

        let signature = wallet.sign("msg").unwrap();
        assert!(verify_signature(&loaded, "msg", &signature).unwrap());
    }

    #[test]
    fn test_load_public_key_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_public_key(&dir.path().join("missing.pem")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pem").unwrap();
        let err = load_public_key(file.path()).unwrap_err();
        let err = err.downcast::<powallet::Error>().unwrap();
        assert!(err.is_malformed());
    }
}
