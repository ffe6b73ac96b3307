//! Arbiter server binary.
//!
//! Runs the HTTP surface for proposal and vote submissions plus the
//! background loop that triggers player turns and enforces the proposal
//! timeout.

use actix_web::web;
use clap::Parser;
use nomic_arbiter::game::Engine;
use nomic_arbiter::hosting::Arbiter;
use nomic_arbiter::hosting::Players;
use nomic_arbiter::hosting::Scheduler;
use nomic_arbiter::hosting::Timer;
use nomic_arbiter::hosting::Workspace;
use nomic_arbiter::save::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Nomic arbiter server")]
struct Args {
    /// Address to serve the HTTP surface on.
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: String,
    /// State document; written atomically after every transition.
    #[arg(long, default_value = "state.json")]
    state: PathBuf,
    /// Roster document; read only when no state document exists.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Git checkout shared with the players.
    #[arg(long, default_value = "repo")]
    repo: PathBuf,
    /// Seconds the current player has to submit a proposal.
    #[arg(long, default_value_t = 1200)]
    proposal_timeout: u64,
    /// Optional shell command run against a passed branch before merging.
    #[arg(long)]
    check: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    nomic_arbiter::log();
    nomic_arbiter::kys();

    let store = Store::new(&args.state, &args.config);
    let state = store.load().expect("load game state");
    let engine = Engine::new(state, store);
    let workspace = Workspace::new(&args.repo, args.check.clone());
    workspace.init().await.expect("initialize repository");
    let arbiter = Arc::new(Arbiter::new(engine, Players::default(), workspace));

    let timer = Timer::new(Duration::from_secs(args.proposal_timeout));
    tokio::spawn(Scheduler::new(arbiter.clone(), timer).run());

    nomic_arbiter::hosting::Server::run(web::Data::from(arbiter), &args.bind)
        .await
        .expect("run server");
}
