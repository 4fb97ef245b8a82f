mod api;
mod app;
mod cli;
mod config;
mod filter;
mod journal;
mod loader;
mod model;
mod pages;
mod remote;
mod router;
mod session;
mod store;
mod task;
#[cfg(test)]
mod testing;
mod ui;

use anyhow::{bail, Result};
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tutsville", about = "Terminal client for the TutsVILLE tutoring marketplace")]
pub struct Args {
    #[arg(
        short = 'c',
        long = "command",
        help = "Run commands separated by ';' and exit"
    )]
    pub command: Option<String>,

    #[arg(long, env = "TUTSVILLE_BASE_URL", help = "Backend URL (overrides config)")]
    pub base_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Activity journal directory")]
    pub journal_dir: Option<PathBuf>,

    #[arg(long, help = "Trace every request to stderr")]
    pub trace: bool,

    #[arg(long, help = "Verbose output (navigation and dispatched actions)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (print effective settings)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    if let Some(base_url) = &args.base_url {
        cfg.base_url = Some(base_url.clone());
    }
    if let Some(dir) = &args.journal_dir {
        cfg.journal.dir = Some(dir.clone());
        cfg.journal.enabled = Some(true);
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        bail!("Invalid configuration ({} errors)", errors.len());
    }

    if args.debug {
        eprintln!("[DEBUG] Base URL: {}", cfg.base_url());
        eprintln!("[DEBUG] Request timeout: {}ms", cfg.timeout_ms());
        eprintln!("[DEBUG] Settle timeout: {}ms", cfg.settle_timeout_ms());
        eprintln!("[DEBUG] Session file: {:?}", cfg.session_file());
        eprintln!(
            "[DEBUG] Journal: {}",
            if cfg.journal_enabled() {
                cfg.journal_dir().display().to_string()
            } else {
                "off".to_string()
            }
        );
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let session_file = session::SessionFile::new(&cfg.session_file());
    let jar = Arc::new(Mutex::new(session_file.load()?));

    let tracing = Arc::new(AtomicBool::new(args.trace));
    let client = remote::HttpClient::new(
        cfg.base_url(),
        Duration::from_millis(cfg.timeout_ms()),
        jar.clone(),
    );
    let env = pages::PageEnv::new(
        Arc::new(cli::TracedRemote::new(client, tracing.clone())),
        Rc::new(task::ThreadExecutor),
        store::Store::new(),
        jar.clone(),
    );

    let journal = if cfg.journal_enabled() {
        let path = cfg.journal_dir().join(format!("{}.jsonl", session_id));
        Some(journal::Journal::new(&path, &session_id, cfg.base_url())?)
    } else {
        None
    };

    let ctx = cli::Context {
        args,
        config: cfg,
        session_id,
        app: RefCell::new(app::App::new(env, "/")),
        journal: Rc::new(RefCell::new(journal)),
        jar,
        session_file,
        tracing,
    };
    cli::watch_store(&ctx);

    if let Some(script) = &ctx.args.command {
        cli::run_once(&ctx, script)
    } else {
        cli::run_repl(ctx)
    }
}
