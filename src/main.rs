use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy_primitives::Address;
use clap::Parser;

use abicon::config::{self, Config, DEFAULT_RPC};
use abicon::core::SessionContext;
use abicon::infrastructure::abi::load_interface;
use abicon::infrastructure::{connect, CtrlC, ProviderConfig, WalkDirListing};
use abicon::ui::{Prompter, Terminal};
use abicon::{logging, App, Backends};

/// Interface description missing or malformed
const EXIT_BAD_INTERFACE: u8 = 3;
/// Node endpoint unreachable
const EXIT_UNREACHABLE: u8 = 4;

#[derive(Debug, Parser)]
#[command(
    name = "abicon",
    version,
    about = "abicon: an interactive console for a contract's ABI"
)]
struct Args {
    /// Node endpoint: http(s):// or ws(s):// URL, or an IPC socket path
    #[arg(long)]
    rpc: Option<String>,

    /// Directory key files are picked from (default: current directory)
    #[arg(long)]
    key_dir: Option<PathBuf>,

    /// Do not read or write command history
    #[arg(long)]
    no_history: bool,

    /// Address of the deployed contract
    address: Address,

    /// ABI JSON file (raw array or compiler artifact)
    abi_file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();
    let config = config::load();

    let interface = match load_interface(&args.abi_file) {
        Ok(interface) => interface,
        Err(err) => {
            eprintln!("cannot load interface: {err:#}");
            return ExitCode::from(EXIT_BAD_INTERFACE);
        }
    };

    let endpoint = args
        .rpc
        .clone()
        .or_else(|| config.rpc.clone())
        .unwrap_or_else(|| DEFAULT_RPC.to_string());
    let contract = match ProviderConfig::from_endpoint(&endpoint) {
        Ok(provider) => connect(provider, args.address).await,
        Err(err) => Err(err),
    };
    let contract = match contract {
        Ok(contract) => Arc::new(contract),
        Err(err) => {
            eprintln!("cannot reach {endpoint}: {err:#}");
            return ExitCode::from(EXIT_UNREACHABLE);
        }
    };

    let history = history_file(&args, &config);
    let terminal = match Terminal::new(history) {
        Ok(terminal) => terminal,
        Err(err) => {
            eprintln!("cannot open terminal: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = SessionContext::new(key_dir(&args, &config));
    let prompter = Prompter::new(terminal, io::stdout(), Arc::new(WalkDirListing));
    let backends = Backends {
        binding: contract.clone(),
        gas: contract.clone(),
        interrupt: Arc::new(CtrlC),
    };

    println!(
        "{} at {} ({} methods, {} events). type help for commands",
        contract.address(),
        contract.endpoint_name(),
        interface.methods().count(),
        interface.events().count()
    );

    let mut app = App::new(interface, ctx, prompter, backends);
    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn key_dir(args: &Args, config: &Config) -> PathBuf {
    args.key_dir
        .clone()
        .or_else(|| config.key_dir.as_deref().and_then(config::expand_path))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn history_file(args: &Args, config: &Config) -> Option<PathBuf> {
    if args.no_history || !config.history_enabled() {
        return None;
    }
    config::history_path()
}
