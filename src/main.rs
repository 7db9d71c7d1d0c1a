use std::io::{self, Read as _};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tokensign::keys::{generate_key, read_key_file, write_key_file};
use tokensign::types::{AlgorithmSpec, Family, HashAlgorithm, NamedCurve};
use tokensign::{inspect_token, sign, verify};

#[derive(Parser)]
#[command(name = "tokensign", version, about = "Minimal signed tokens with an authenticated expiry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Algorithm parameters, named as in Web Crypto.
#[derive(Args)]
struct AlgorithmArgs {
    /// HMAC, RSASSA-PKCS1-v1_5, RSA-PSS, ECDSA or Ed25519
    #[arg(long, default_value = "HMAC")]
    algorithm: Family,

    /// SHA-1, SHA-256, SHA-384 or SHA-512 (ignored by Ed25519)
    #[arg(long, default_value = "SHA-256")]
    hash: HashAlgorithm,

    /// P-256 or P-384 (ECDSA only)
    #[arg(long)]
    curve: Option<NamedCurve>,

    /// RSA modulus length in bits (default 2048)
    #[arg(long)]
    modulus_length: Option<u32>,

    /// RSA-PSS salt length in bytes (default: digest length)
    #[arg(long)]
    salt_length: Option<u32>,
}

impl AlgorithmArgs {
    fn spec(&self) -> AlgorithmSpec {
        AlgorithmSpec {
            family: self.algorithm,
            hash: self.hash,
            curve: self.curve,
            modulus_length: self.modulus_length,
            salt_length: self.salt_length,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key and write it to a file.
    /// A `.json` path gets raw JSON, anything else an `export default` module.
    GenerateKey {
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        algorithm: AlgorithmArgs,
    },

    /// Sign data and print the token.
    Sign {
        /// Key file path.
        #[arg(short, long, env = "TOKENSIGN_KEY")]
        key: PathBuf,

        /// Token lifetime (e.g. "10m", "1h", "7d"). Omit for a token that never expires.
        #[arg(short, long)]
        expire: Option<humantime::Duration>,

        /// Override the clock, in milliseconds since the Unix epoch (0 reads the system clock).
        #[arg(long)]
        now: Option<u64>,

        #[command(flatten)]
        algorithm: AlgorithmArgs,

        data: String,
    },

    /// Verify a token against data. Exits with status 1 when invalid.
    Verify {
        /// Key file path.
        #[arg(short, long, env = "TOKENSIGN_KEY")]
        key: PathBuf,

        /// Token to check. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,

        /// Override the clock, in milliseconds since the Unix epoch (0 reads the system clock).
        #[arg(long)]
        now: Option<u64>,

        #[command(flatten)]
        algorithm: AlgorithmArgs,

        data: String,
    },

    /// Show a token's signature and expiry without verifying it.
    Inspect {
        /// Token to inspect. If omitted, reads from stdin.
        token: Option<String>,
    },

    /// Derive the verify-only key from an asymmetric private key.
    PublicKey {
        #[arg(short, long, env = "TOKENSIGN_KEY")]
        key: PathBuf,

        /// Write the public key here instead of printing it.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::GenerateKey { out, algorithm } => cmd_generate_key(&out, &algorithm.spec()),
        Command::Sign {
            key,
            expire,
            now,
            algorithm,
            data,
        } => cmd_sign(&key, expire, now, &algorithm.spec(), &data),
        Command::Verify {
            key,
            token,
            now,
            algorithm,
            data,
        } => cmd_verify(&key, token, now, &algorithm.spec(), &data),
        Command::Inspect { token } => cmd_inspect(token),
        Command::PublicKey { key, out } => cmd_public_key(&key, out.as_deref()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. Filter with `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn cmd_generate_key(out: &Path, algorithm: &AlgorithmSpec) -> CmdResult {
    let jwk = generate_key(out, algorithm)?;
    println!("{}", serde_json::to_string_pretty(&jwk)?);
    Ok(true)
}

fn cmd_sign(
    key_path: &Path,
    expire: Option<humantime::Duration>,
    now: Option<u64>,
    algorithm: &AlgorithmSpec,
    data: &str,
) -> CmdResult {
    let key = read_key_file(key_path)?;
    let expire_secs = match expire {
        Some(lifetime) => match std::time::Duration::from(lifetime).as_secs() {
            0 => return Err("expiry must be at least one second".into()),
            secs => secs,
        },
        None => 0,
    };
    let token = sign(&key, data, algorithm, expire_secs, now)?;
    println!("{token}");
    Ok(true)
}

fn cmd_verify(
    key_path: &Path,
    token_arg: Option<String>,
    now: Option<u64>,
    algorithm: &AlgorithmSpec,
    data: &str,
) -> CmdResult {
    let key = read_key_file(key_path)?;
    let token = read_token(token_arg)?;
    let valid = verify(&key, &token, data, algorithm, now)?;
    let expires_at = inspect_token(&token).ok().and_then(|info| info.expires_at);

    let output = serde_json::json!({
        "valid": valid,
        "expires_at": expires_at,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(valid)
}

fn cmd_inspect(token_arg: Option<String>) -> CmdResult {
    let token = read_token(token_arg)?;
    let info = inspect_token(&token)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(true)
}

fn cmd_public_key(key_path: &Path, out: Option<&Path>) -> CmdResult {
    let public = read_key_file(key_path)?.to_public()?;
    match out {
        Some(path) => write_key_file(path, &public)?,
        None => println!("{}", serde_json::to_string_pretty(&public)?),
    }
    Ok(true)
}

/// Read a token from the argument or stdin, trimming surrounding whitespace.
fn read_token(token_arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let input = match token_arg {
        Some(s) => s,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let token = input.trim();
    if token.is_empty() {
        return Err("no token given".into());
    }
    Ok(token.to_string())
}
