//! NoLet command line
//!
//! Registers push devices and sends notifications to them:
//!
//!   nolet devices add phone abcdefghijklmnopqrstuv
//!   nolet ping
//!   nolet send "Hello" --title "From the terminal"
//!
//! Devices and preferences live in a JSON device book (`--book`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nolet_cli::DeviceBook;
use nolet_crypto::{Algorithm, EncryptionConfig, Mode};
use nolet_gateway::{
    add_device, canonicalize_with_host, edit_device, is_valid_endpoint, remove_device,
    DeviceDraft, GatewayConfig, PingResult, PushClient, PushContent,
};
use nolet_types::generate_id;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nolet")]
#[command(about = "Send push notifications to NoLet devices")]
struct Args {
    /// Path to the device book
    #[arg(short, long, default_value = "nolet-devices.json")]
    book: PathBuf,

    /// Path to a gateway settings file (JSON)
    #[arg(long)]
    gateway_config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical form of an endpoint
    Canonicalize { raw: String },

    /// Manage registered devices
    #[command(subcommand)]
    Devices(DevicesCommand),

    /// Check that a device's gateway is reachable
    Ping {
        /// Device id or alias (default device if omitted)
        device: Option<String>,
    },

    /// Send a push
    Send {
        body: String,
        #[arg(short, long, default_value = "")]
        title: String,
        #[arg(short, long)]
        url: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Overrides the book's sound preference
        #[arg(long)]
        sound: Option<String>,
        /// Target device id or alias; repeatable
        #[arg(short, long = "device")]
        devices: Vec<String>,
        /// Send to every registered device
        #[arg(long)]
        all: bool,
        /// BODY is ciphertext produced elsewhere; forward it untouched
        #[arg(long)]
        ciphertext: bool,
        /// IV belonging to a pre-encrypted BODY
        #[arg(long, requires = "ciphertext")]
        iv: Option<String>,
    },

    /// Manage the shared encryption settings
    #[command(subcommand)]
    Encryption(EncryptionCommand),
}

#[derive(Subcommand, Debug)]
enum DevicesCommand {
    List,
    Add {
        alias: String,
        api_url: String,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long, default_value = "")]
        pwd: String,
    },
    Edit {
        device: String,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long, default_value = "")]
        pwd: String,
    },
    Remove {
        device: String,
    },
    /// Make a device the default target
    Default {
        device: String,
    },
}

#[derive(Subcommand, Debug)]
enum EncryptionCommand {
    Set {
        #[arg(long, value_enum)]
        algorithm: AlgorithmArg,
        #[arg(long, value_enum, default_value = "gcm")]
        mode: ModeArg,
        #[arg(long)]
        key: String,
    },
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlgorithmArg {
    Aes128,
    Aes192,
    Aes256,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Aes128 => Algorithm::Aes128,
            AlgorithmArg::Aes192 => Algorithm::Aes192,
            AlgorithmArg::Aes256 => Algorithm::Aes256,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Gcm,
    Cbc,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Gcm => Mode::Gcm,
            ModeArg::Cbc => Mode::Cbc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let config = load_gateway_config(args.gateway_config.as_deref())?;
    let mut book = DeviceBook::load(&args.book)?;

    match args.command {
        Command::Canonicalize { raw } => {
            let canonical = canonicalize_with_host(&raw, &config.first_party_host);
            println!("{canonical}");
            if !is_valid_endpoint(&canonical) {
                bail!("{canonical} is not a usable endpoint");
            }
        }
        Command::Devices(cmd) => {
            run_devices(cmd, &mut book, &config)?;
            book.save(&args.book)?;
        }
        Command::Encryption(cmd) => {
            match cmd {
                EncryptionCommand::Set {
                    algorithm,
                    mode,
                    key,
                } => {
                    book.set_encryption(EncryptionConfig::new(algorithm.into(), mode.into(), key));
                }
                EncryptionCommand::Clear => book.encryption = None,
            }
            book.save(&args.book)?;
        }
        Command::Ping { device } => {
            let target = match device.as_deref() {
                Some(selector) => book.find(selector),
                None => book.default_device(),
            }
            .context("No such device")?;

            let client = PushClient::new(config)?;
            match client.ping(&target.api_url).await {
                PingResult::Ok {
                    latency_ms,
                    message,
                    ..
                } => println!("{}: {message} ({latency_ms} ms)", target.alias),
                PingResult::GatewayFailure { code, message } => {
                    bail!("{}: [{code}] {message}", target.alias)
                }
                PingResult::Timeout => bail!("{}: timed out", target.alias),
                PingResult::Cancelled => bail!("{}: cancelled", target.alias),
                PingResult::Network(e) => bail!("{}: network error: {e}", target.alias),
                PingResult::InvalidBody(e) => bail!("{}: invalid response: {e}", target.alias),
                PingResult::InvalidEndpoint(e) => bail!("{}: {e}", target.alias),
            }
        }
        Command::Send {
            body,
            title,
            url,
            icon,
            sound,
            devices,
            all,
            ciphertext,
            iv,
        } => {
            let targets = book.targets(&devices, all)?;
            let mut content = PushContent::new(body).with_title(title);
            content.url = url;
            content.icon = icon;
            content.sound = sound.or_else(|| book.sound.clone());
            if ciphertext {
                content = content.pre_encrypted(iv);
            }

            let id = generate_id();
            let client = PushClient::new(config)?;
            info!("Sending push {} to {} device(s)", id, targets.len());
            let outcomes = client.send_fanout(&targets, &content, &id).await;

            let mut failed = 0;
            for outcome in outcomes {
                match outcome.result {
                    Ok(reply) => println!("{}: {}", outcome.alias, reply.message),
                    Err(e) => {
                        failed += 1;
                        warn!("{} failed: {}", outcome.alias, e);
                        eprintln!("{}: {e}", outcome.alias);
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} device(s) failed");
            }
        }
    }

    Ok(())
}

fn run_devices(cmd: DevicesCommand, book: &mut DeviceBook, config: &GatewayConfig) -> Result<()> {
    let host = config.first_party_host.as_str();
    match cmd {
        DevicesCommand::List => {
            let default = book.default_device().map(|d| d.id);
            for device in &book.devices {
                let marker = if Some(device.id) == default { "*" } else { " " };
                let lock = if device.encryption.is_some() { " [encrypted]" } else { "" };
                println!("{marker} {}  {}  {}{lock}", device.id, device.alias, device.api_url);
            }
        }
        DevicesCommand::Add {
            alias,
            api_url,
            user,
            pwd,
        } => {
            let device = DeviceDraft::new(alias, api_url)
                .with_basic_auth(user, pwd)
                .into_device_with_host(None, host)?;
            println!("Added {} ({})", device.alias, device.api_url);
            book.devices = add_device(&book.devices, device)?;
        }
        DevicesCommand::Edit {
            device,
            alias,
            api_url,
            user,
            pwd,
        } => {
            let existing = book
                .find(&device)
                .with_context(|| format!("Unknown device: {device}"))?
                .clone();
            let keep_auth = user.is_empty() && pwd.is_empty();
            let mut edited = DeviceDraft::new(
                alias.unwrap_or_else(|| existing.alias.clone()),
                api_url.unwrap_or_else(|| existing.api_url.clone()),
            )
            .with_basic_auth(user, pwd)
            .into_device_with_host(Some(&existing), host)?;
            if keep_auth {
                edited.authorization = existing.authorization.clone();
            }
            book.devices = edit_device(&book.devices, existing.id, edited)?;
        }
        DevicesCommand::Remove { device } => {
            let id = book
                .find(&device)
                .with_context(|| format!("Unknown device: {device}"))?
                .id;
            book.devices = remove_device(&book.devices, id);
            if book.default_device == Some(id) {
                book.default_device = None;
            }
        }
        DevicesCommand::Default { device } => {
            let id = book
                .find(&device)
                .with_context(|| format!("Unknown device: {device}"))?
                .id;
            book.default_device = Some(id);
        }
    }
    Ok(())
}

fn load_gateway_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let Some(path) = path else {
        return Ok(GatewayConfig::default());
    };
    info!("Loading gateway settings from {:?}", path);
    let bytes = fs::read(path).context("Failed to read gateway settings")?;
    serde_json::from_slice(&bytes).context("Failed to parse gateway settings")
}
