//! Argument parsing and subcommand dispatch (C9). Thin on logic: every branch below maps
//! directly onto one `erasmus::App` operation.

pub mod edit;
pub mod prompts;

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use erasmus::context_store::ContextStore;
use erasmus::protocol_store::ProtocolStore;
use erasmus::{App, Error, PlanningKind, Result};

#[derive(Parser)]
#[command(name = "erasmus", version, about = "Merge project planning documents and a protocol into an AI assistant's rules file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize `.erasmus/`, create a first context if none exist, select a protocol, merge.
    Setup,
    /// CRUD and load/store operations over named planning-document triples.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
    /// CRUD and selection operations over named protocol fragments.
    Protocol {
        #[command(subcommand)]
        action: ProtocolAction,
    },
    /// Start the watcher and block until interrupted.
    Watch,
}

#[derive(Subcommand)]
pub enum ContextAction {
    List,
    Create { name: String },
    Delete { name: String },
    Show { name: String, kind: PlanningKindArg },
    /// Replace one file's body with the content read from stdin.
    Update { name: String, kind: PlanningKindArg },
    Edit { name: String, kind: PlanningKindArg },
    /// Capture the live planning files into a new context.
    Store,
    /// Confirm a context by name, without changing any persisted state. If omitted and more
    /// than one context exists, prompts interactively.
    Select { name: Option<String> },
    /// Copy a context's files onto the live planning files and merge. If omitted and more
    /// than one context exists, prompts interactively.
    Load { name: Option<String> },
}

#[derive(Subcommand)]
pub enum ProtocolAction {
    List,
    /// Create from stdin; an empty body falls back to the packaged protocol template.
    Create { name: String },
    Update { name: String },
    Delete { name: String },
    Show { name: String },
    Select { name: String },
    Edit { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PlanningKindArg {
    Architecture,
    Progress,
    Tasks,
}

impl From<PlanningKindArg> for PlanningKind {
    fn from(value: PlanningKindArg) -> Self {
        match value {
            PlanningKindArg::Architecture => PlanningKind::Architecture,
            PlanningKindArg::Progress => PlanningKind::Progress,
            PlanningKindArg::Tasks => PlanningKind::Tasks,
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| Error::io("read", PathBuf::from("<stdin>"), e))?;
    Ok(buf)
}

pub fn dispatch(command: Command, app: &App) -> Result<()> {
    match command {
        Command::Setup => {
            let protocol = app
                .protocols()
                .list()
                .first()
                .cloned()
                .unwrap_or_else(|| "standard".to_string());
            app.setup("default", &protocol)?;
            println!("erasmus is set up for {}", app.paths().rules_file().display());
            if let Some(global) = app.paths().editor().global_rules_file(app.paths().root()) {
                println!("note: {} is never watched or overwritten by erasmus", global.display());
            }
            Ok(())
        }
        Command::Context { action } => dispatch_context(action, app),
        Command::Protocol { action } => dispatch_protocol(action, app),
        Command::Watch => {
            let mut watcher = app.start_watching()?;
            let (tx, rx) = std::sync::mpsc::channel();
            ctrlc::set_handler(move || {
                let _ = tx.send(());
            })
            .map_err(|e| Error::io("signal", PathBuf::from("SIGINT"), std::io::Error::other(e)))?;
            println!("watching for changes; press Ctrl-C to stop");
            let _ = rx.recv();
            watcher.stop();
            Ok(())
        }
    }
}

fn dispatch_context(action: ContextAction, app: &App) -> Result<()> {
    match action {
        ContextAction::List => {
            for name in app.contexts().list()? {
                println!("{name}");
            }
            Ok(())
        }
        ContextAction::Create { name } => {
            let created = app.contexts().create(&name, Default::default())?;
            println!("created context {created}");
            Ok(())
        }
        ContextAction::Delete { name } => app.contexts().delete(&name),
        ContextAction::Show { name, kind } => {
            match app.contexts().read(&name, kind.into())? {
                Some(body) => println!("{body}"),
                None => println!(),
            }
            Ok(())
        }
        ContextAction::Update { name, kind } => {
            let body = read_stdin()?;
            app.contexts().update(&name, kind.into(), &body)
        }
        ContextAction::Edit { name, kind } => {
            let current = app.contexts().read(&name, kind.into())?.unwrap_or_default();
            let edited = edit::edit_text(&current)?;
            app.contexts().update(&name, kind.into(), &edited)?;
            app.merge_now()?;
            Ok(())
        }
        ContextAction::Store => {
            let name = app.store_context()?;
            println!("stored live files as context {name}");
            Ok(())
        }
        ContextAction::Select { name } => {
            let name = resolve_context_name(app, name)?;
            if !app.contexts().list()?.iter().any(|n| n == &name) {
                return Err(Error::NotFound { kind: erasmus::error::EntityKind::Context, name });
            }
            println!("selected context {name}");
            Ok(())
        }
        ContextAction::Load { name } => {
            let name = resolve_context_name(app, name)?;
            let failures = app.load_context(&name)?;
            for failure in &failures {
                eprintln!("warning: {failure}");
            }
            println!("loaded context {name}");
            Ok(())
        }
    }
}

/// Resolve a context name: use it as given, auto-pick the sole context, or prompt when more
/// than one exists and none was named.
fn resolve_context_name(app: &App, name: Option<String>) -> Result<String> {
    if let Some(name) = name {
        return Ok(name);
    }
    let available = app.contexts().list()?;
    match available.len() {
        0 => Err(Error::NotFound { kind: erasmus::error::EntityKind::Context, name: String::new() }),
        1 => Ok(available.into_iter().next().unwrap()),
        _ => prompts::prompt_from_list("Which context?", &available)
            .map_err(|e| Error::io("prompt", PathBuf::from("<stdin>"), e))?
            .ok_or_else(|| Error::NotFound { kind: erasmus::error::EntityKind::Context, name: String::new() }),
    }
}

fn dispatch_protocol(action: ProtocolAction, app: &App) -> Result<()> {
    match action {
        ProtocolAction::List => {
            for name in app.protocols().list() {
                println!("{name}");
            }
            Ok(())
        }
        ProtocolAction::Create { name } => {
            let body = read_stdin().unwrap_or_default();
            let created = app.protocols().create(&name, &body)?;
            println!("created protocol {created}");
            Ok(())
        }
        ProtocolAction::Update { name } => {
            let body = read_stdin()?;
            app.protocols().update(&name, &body)
        }
        ProtocolAction::Delete { name } => app.protocols().delete(&name),
        ProtocolAction::Show { name } => {
            match app.protocols().get(&name) {
                Some((body, origin)) => println!("# origin: {origin:?}\n{body}"),
                None => return Err(Error::NotFound { kind: erasmus::error::EntityKind::Protocol, name }),
            }
            Ok(())
        }
        ProtocolAction::Select { name } => {
            app.select_protocol(&name)?;
            println!("selected protocol {name}");
            Ok(())
        }
        ProtocolAction::Edit { name } => {
            let (current, _origin) = app
                .protocols()
                .get(&name)
                .ok_or_else(|| Error::NotFound { kind: erasmus::error::EntityKind::Protocol, name: name.clone() })?;
            let edited = edit::edit_text(&current)?;
            app.protocols().update(&name, &edited)?;
            app.merge_now()?;
            Ok(())
        }
    }
}
