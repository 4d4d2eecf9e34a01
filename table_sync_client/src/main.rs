//! A terminal client that follows one poker table.
//!
//! The client polls the table server, prints a summary whenever the table
//! changes, and reads commands from stdin to act for the configured seat.

use anyhow::{Context, Result};
use chrono::Local;
use pico_args::Arguments;
use std::sync::Arc;
use table_sync::{
    DerivedState, DispatchOutcome, LocalIdentity, SnapshotStore, StandardRules, TableSession,
    gateway::{ActionSubmitter, TableGateway},
};
use table_sync_client::{
    api_client::ApiClient,
    commands::{Command, HELP_TEXT, parse_command},
    config::ClientConfig,
    display, logging,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const HELP: &str = "\
Follow a poker table and act for one seat

USAGE:
  table_sync_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:8080]
  --table ADDRESS       Table to follow  [env: TABLE_ID]
  --address ADDRESS     Player address to act for  [env: PLAYER_ADDRESS]

FLAGS:
  -h, --help            Print help information

Timing can be tuned with the TABLE_SYNC_* environment variables.
";

struct Args {
    server_url: Option<String>,
    table_id: Option<String>,
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    dotenvy::dotenv().ok();
    logging::init();

    let args = Args {
        server_url: pargs.opt_value_from_str("--server").ok().flatten(),
        table_id: pargs.opt_value_from_str("--table").ok().flatten(),
        address: pargs.opt_value_from_str("--address").ok().flatten(),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env()
        .context("Invalid configuration")?
        .with_overrides(args.server_url, args.table_id, args.address);
    config.validate().context("Invalid configuration")?;

    let api = Arc::new(ApiClient::new(config.server_url.clone())?);
    let identity = match &config.address {
        Some(address) => LocalIdentity::from_address(address),
        None => LocalIdentity::anonymous(),
    };

    if !identity.is_known() {
        println!("No player address configured: watching only");
    }

    let gateway: Arc<dyn TableGateway> = api.clone();
    let submitter: Arc<dyn ActionSubmitter> = api;
    let session = TableSession::start(
        config.table_id.clone(),
        config.sync.clone(),
        gateway,
        submitter,
        identity,
        Arc::new(StandardRules::new(config.sync.turn_budget)),
    );

    let printer = tokio::spawn(print_on_change(
        session.derived(),
        session.store().clone(),
    ));

    println!(
        "Following table {} on {}",
        config.table_id, config.server_url
    );
    println!("{HELP_TEXT}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&session, command).await,
            Err(e) => println!("{}", e),
        }
    }

    printer.abort();
    session.teardown();

    println!("\nLeft table.");
    Ok(())
}

async fn execute(session: &TableSession, command: Command) {
    match command {
        Command::Act { action, amount } => {
            match session
                .dispatcher()
                .set_player_action(action.clone(), amount)
                .await
            {
                Ok(DispatchOutcome::Submitted { nonce }) => {
                    println!("Sent {} (nonce {})", action, nonce);
                }
                Ok(DispatchOutcome::Skipped) => {
                    println!("Not sent: no nonce known yet for this player");
                }
                Err(e) => println!("{} failed: {}", action, e),
            }
        }
        Command::Deal => match session.deal_table().await {
            Ok(()) => println!("Dealt"),
            Err(e) => println!("Deal failed: {}", e),
        },
        Command::Seat(seat) => match session.get_user_by_seat(seat).await {
            Some(data) => println!(
                "{}",
                serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
            ),
            None => println!("No data for seat {} yet", seat),
        },
        Command::State => {
            let snapshot = session.store().read();
            println!(
                "{}",
                display::render_summary(&session.current(), snapshot.as_deref())
            );
        }
        Command::Help => println!("{HELP_TEXT}"),
        Command::Quit => {}
    }
}

/// Print the table every time derived state is recomputed
async fn print_on_change(mut derived: watch::Receiver<Arc<DerivedState>>, store: SnapshotStore) {
    while derived.changed().await.is_ok() {
        let current = derived.borrow_and_update().clone();
        let snapshot = store.read();
        println!(
            "\n[{}]\n{}",
            Local::now().format("%H:%M:%S"),
            display::render_summary(&current, snapshot.as_deref())
        );
    }
}
