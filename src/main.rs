use clap::Parser;
use std::io;
use std::process;

use tryolib::config::Config;
use tryolib::console::{Console, Outcome};
use tryolib::process::ProcessManager;
use tryolib::session::NarrowingSession;
use tryolib::{logging, Result};

/// Search, narrow and poke integer values in a running process
#[derive(Parser)]
#[command(name = "tryolite")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Process id or exact process name
    #[arg(value_name = "PID|NAME")]
    target: String,
}

fn run(target: &str, config: Config) -> Result<Outcome> {
    let process_manager = match target.parse::<i32>() {
        Ok(pid) => ProcessManager::from_pid(pid)?,
        Err(_) => ProcessManager::new(target)?,
    };
    let regions = process_manager.regions()?.into_regions();

    let mut session = NarrowingSession::new(&process_manager, regions, config);
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    console.run(&mut session)
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    if let Err(err) = logging::init(config.log_level) {
        eprintln!("{}", err);
    }

    match run(&cli.target, config) {
        Ok(outcome) => log::debug!("Session ended: {:?}", outcome),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
