use crate::app::{App, Command, USAGE};
use crate::config::Config;
use crate::journal::Journal;
use crate::remote::{CallOptions, HttpError, RemoteCall};
use crate::session::{CookieJar, SessionFile};
use crate::store::AlertLevel;
use crate::Args;
use anyhow::{anyhow, Context as _, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub session_id: String,
    pub app: RefCell<App>,
    pub journal: Rc<RefCell<Option<Journal>>>,
    pub jar: Arc<Mutex<CookieJar>>,
    pub session_file: SessionFile,
    pub tracing: Arc<AtomicBool>,
}

/// Prints one `[TRACE:http]` line per remote call while tracing is on
pub struct TracedRemote<R> {
    inner: R,
    enabled: Arc<AtomicBool>,
}

impl<R: RemoteCall> TracedRemote<R> {
    pub fn new(inner: R, enabled: Arc<AtomicBool>) -> Self {
        Self { inner, enabled }
    }
}

impl<R: RemoteCall> RemoteCall for TracedRemote<R> {
    fn call(&self, path: &str, options: &CallOptions) -> Result<Value, HttpError> {
        let result = self.inner.call(path, options);
        if self.enabled.load(Ordering::Relaxed) {
            let outcome = match &result {
                Ok(_) => "ok".to_string(),
                Err(err) => err.to_string(),
            };
            eprintln!(
                "[TRACE:http] {} {} -> {}",
                options.method.as_str(),
                path,
                outcome
            );
        }
        result
    }
}

fn verbose(ctx: &Context, message: &str) {
    if ctx.args.verbose {
        eprintln!("[VERBOSE] {}", message);
    }
}

fn settle_timeout(ctx: &Context) -> Duration {
    Duration::from_millis(ctx.config.settle_timeout_ms())
}

/// Journal and report every dispatched action
pub fn watch_store(ctx: &Context) {
    let journal = ctx.journal.clone();
    let verbose = ctx.args.verbose;
    let store = ctx.app.borrow().env().store.clone();
    store.subscribe(move |action| {
        if verbose {
            eprintln!("[VERBOSE] dispatch {}", action.name());
        }
        if let Some(journal) = journal.borrow_mut().as_mut() {
            let _ = journal.dispatched(action);
        }
    });
}

pub fn run_once(ctx: &Context, script: &str) -> Result<()> {
    ctx.app.borrow_mut().settle(settle_timeout(ctx));
    flush_alerts(ctx);

    for line in split_script(script) {
        let line = line.as_str();
        if line.starts_with('/') {
            if handle_command(ctx, line) {
                return Ok(());
            }
            continue;
        }
        run_line(ctx, line).with_context(|| format!("Command failed: {}", line))?;
    }

    print_page(ctx);
    Ok(())
}

/// Split a `-c` script on `;` outside quotes, dropping empty commands
fn split_script(script: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = script.chars();

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', q) if q != Some('\'') => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ('"' | '\'', None) => {
                quote = Some(c);
                current.push(c);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(c);
            }
            (';', None) => lines.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    lines.push(current);

    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("tutsville - type /help for commands, /exit to quit");
    ctx.app.borrow_mut().settle(settle_timeout(&ctx));
    flush_alerts(&ctx);
    print_page(&ctx);

    loop {
        let prompt = format!("tutsville:{}> ", ctx.app.borrow().route().path());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line.starts_with('/') {
                    if handle_command(&ctx, line) {
                        break;
                    }
                    continue;
                }

                match run_line(&ctx, line) {
                    Ok(()) => print_page(&ctx),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Run one command and wait for the page it leaves behind
fn run_line(ctx: &Context, line: &str) -> Result<()> {
    if let Some(journal) = ctx.journal.borrow_mut().as_mut() {
        let _ = journal.command(line);
    }
    let result = execute_line(ctx, line);
    flush_alerts(ctx);
    if let Err(e) = save_session(ctx) {
        eprintln!("Warning: failed to save session: {}", e);
    }
    result
}

fn execute_line(ctx: &Context, line: &str) -> Result<()> {
    let command = Command::parse(line)?;
    let mut app = ctx.app.borrow_mut();
    app.settle(settle_timeout(ctx));

    let before = app.route().clone();
    let message = app.execute(command)?;
    if app.route() != &before {
        let path = app.route().path();
        verbose(ctx, &format!("navigate {}", path));
        if let Some(journal) = ctx.journal.borrow_mut().as_mut() {
            let _ = journal.navigate(&path);
        }
    }

    app.settle(settle_timeout(ctx));
    if let Some(message) = message {
        println!("{}", message);
    }
    Ok(())
}

fn print_page(ctx: &Context) {
    let ui = ctx.app.borrow_mut().render();
    println!("{}", ui.render_text().trim_end());
    // Rendering may have finished work that raised alerts
    flush_alerts(ctx);
}

fn flush_alerts(ctx: &Context) {
    let alerts = ctx.app.borrow().env().store.take_alerts();
    for alert in alerts {
        let level = match alert.level {
            AlertLevel::Error => {
                println!("[alert] {}", alert.text);
                "error"
            }
            AlertLevel::Info => {
                println!("{}", alert.text);
                "info"
            }
        };
        if let Some(journal) = ctx.journal.borrow_mut().as_mut() {
            let _ = journal.alert(level, &alert.text);
        }
    }
}

fn save_session(ctx: &Context) -> Result<()> {
    let mut jar = ctx
        .jar
        .lock()
        .map_err(|_| anyhow!("Cookie jar lock poisoned"))?;
    if jar.take_dirty() {
        ctx.session_file.save(&jar)?;
    }
    Ok(())
}

fn handle_command(ctx: &Context, cmd: &str) -> bool {
    match cmd.split_whitespace().next().unwrap_or(cmd) {
        "/exit" | "/quit" => return true,
        "/help" => {
            println!("Commands:");
            for (_, usage) in USAGE {
                println!("  {}", usage);
            }
            println!("Shell:");
            println!("  /help           - show commands");
            println!("  /session        - show session info");
            println!("  /trace          - toggle request tracing");
            println!("  /exit           - quit");
        }
        "/session" => {
            println!("Session: {}", ctx.session_id);
            println!("Backend: {}", ctx.config.base_url());
            println!("Cookies: {:?}", ctx.session_file.path);
            match ctx.journal.borrow().as_ref() {
                Some(journal) => println!("Journal: {:?}", journal.path),
                None => println!("Journal: off"),
            }
        }
        "/trace" => {
            let on = !ctx.tracing.load(Ordering::Relaxed);
            ctx.tracing.store(on, Ordering::Relaxed);
            println!("Tracing: {}", if on { "on" } else { "off" });
        }
        other => println!("Unknown command: {}", other),
    }
    false
}
