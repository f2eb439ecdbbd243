mod action;
mod prompt;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use registry_core::paths::default_store_path;
use registry_core::{EditField, LibraryStore, LoadError};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::action::{Action, Outcome};
use crate::prompt::{existing_password, new_password, NEW_PASSWORD_ENV, PASSWORD_ENV};

#[derive(Parser, Debug)]
#[command(author, version, about = "Library registry administrator", long_about = None)]
struct Cli {
    /// Store file; defaults to $LIBRARY_REGISTRY_STORE or the user data directory
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty store protected by a new administrator password
    Init,
    /// Show record count and whether a password is set
    Status,
    /// List all libraries
    List,
    /// Add a library
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        address: String,
    },
    /// Delete a library; prompts for a selection when NAME is omitted
    Delete { name: Option<String> },
    /// Change one field of a library; prompts for a selection when NAME is omitted
    Edit {
        name: Option<String>,
        /// name, city or address
        #[arg(long)]
        field: EditField,
        #[arg(long)]
        value: String,
    },
    /// Replace the administrator password
    Passwd,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registry_admin=info,registry_core=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let path = match cli.store {
        Some(path) => path,
        None => default_store_path()
            .ok_or_else(|| anyhow!("cannot determine data directory; pass --store"))?,
    };

    match cli.command {
        Commands::Init => init_command(&path),
        Commands::Status => status_command(&path),
        Commands::List => action_command(&path, Action::View, None),
        Commands::Add {
            name,
            city,
            address,
        } => {
            let mut store = open_authenticated(&path)?;
            store.add_library(&name, &city, &address)?;
            persist(&store, &path)?;
            println!("Added library '{name}'");
            Ok(())
        }
        Commands::Delete { name } => action_command(&path, Action::Delete, name.as_deref()),
        Commands::Edit { name, field, value } => {
            action_command(&path, Action::Edit { field, value }, name.as_deref())
        }
        Commands::Passwd => {
            let mut store = open_authenticated(&path)?;
            let password = new_password("New administrator password", NEW_PASSWORD_ENV)?;
            store.set_credential(&password)?;
            persist(&store, &path)?;
            println!("Administrator password updated");
            Ok(())
        }
    }
}

fn init_command(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("store already exists at {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let password = new_password("Create administrator password", PASSWORD_ENV)?;
    let mut store = LibraryStore::new();
    store.set_credential(&password)?;
    persist(&store, path)?;
    println!("Created library store at {}", path.display());
    Ok(())
}

fn status_command(path: &Path) -> Result<()> {
    let store = open(path)?;
    println!("Store: {}", path.display());
    println!("Libraries: {}", store.len());
    let state = if store.is_credential_set() {
        "set"
    } else {
        "not set"
    };
    println!("Administrator password: {state}");
    Ok(())
}

fn action_command(path: &Path, action: Action, target: Option<&str>) -> Result<()> {
    let mut store = open_authenticated(path)?;
    let outcome = action::run(
        &mut store,
        &action,
        target,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    )?;
    if outcome == Outcome::Changed {
        persist(&store, path)?;
    }
    Ok(())
}

fn open(path: &Path) -> Result<LibraryStore> {
    LibraryStore::open(path).map_err(|err| anyhow!(describe_load_error(&err)))
}

/// Load the store, then either run first-time password setup or check the
/// administrator password.
fn open_authenticated(path: &Path) -> Result<LibraryStore> {
    let mut store = open(path)?;
    if !store.is_credential_set() {
        info!("no administrator password set; running first-time setup");
        let password = new_password("Set administrator password", PASSWORD_ENV)?;
        store.set_credential(&password)?;
        if let Err(err) = persist(&store, path) {
            eprintln!("warning: {err}; continuing with the password held in memory");
        }
        return Ok(store);
    }
    let password = existing_password("Administrator password")?;
    if !store.verify_credential(&password) {
        warn!("administrator password rejected");
        return Err(anyhow!("incorrect administrator password"));
    }
    info!("administrator password accepted");
    Ok(store)
}

fn persist(store: &LibraryStore, path: &Path) -> Result<()> {
    store.save(path).map_err(|err| {
        warn!("change kept in memory only; it will be lost on exit");
        anyhow!("{err}; the change is at risk of being lost")
    })
}

fn describe_load_error(err: &LoadError) -> String {
    let path = err.path().display();
    match err {
        LoadError::NotFound { .. } => {
            format!("store file {path} does not exist; create it with `registry-admin init`")
        }
        LoadError::Malformed { source, .. } => {
            format!("store file {path} is not valid JSON: {source}")
        }
        LoadError::SchemaInvalid { reason, .. } => {
            format!("store file {path} has an invalid structure: {reason}")
        }
        LoadError::Unexpected { source, .. } => {
            format!("unexpected error while reading store file {path}: {source}")
        }
    }
}
