//! `people` binary.
//!
//! Reads `people.toml` (or the path given with `--config`) and `PEOPLE_*`
//! environment variables, opens the selected backend under the storage root
//! and runs one command against it, or a whole `shell` session.
//!
//! ```text
//! people --backend relational insert --nif 12345678X --name "John Doe" \
//!   --phone 612352892 --postal-code 08907
//! people --backend in-memory-list shell < commands.txt
//! ```

mod backend;
mod commands;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use people_core::{backend::BackendKind, registry::Registry};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  backend::AnyStore,
  commands::Command,
  settings::{Settings, expand_tilde},
};

#[derive(Parser)]
#[command(author, version, about = "Personal records in a choice of storage backends")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "people.toml")]
  config: PathBuf,

  /// Storage backend; overrides the config file and environment.
  #[arg(short, long)]
  backend: Option<BackendKind>,

  /// Directory the durable backends keep their folders in.
  #[arg(long)]
  storage_root: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // Load configuration, then let flags win.
  let mut settings = Settings::load(&cli.config)?;
  if let Some(backend) = cli.backend {
    settings.backend = backend;
  }
  if let Some(root) = cli.storage_root {
    settings.storage_root = expand_tilde(&root);
  }

  let store = AnyStore::open(settings.backend, &settings.storage_root).await?;
  tracing::debug!(
    backend = %settings.backend,
    dir = ?settings.backend_dir(),
    "session started"
  );
  if !settings.backend.is_durable() && !matches!(cli.command, Command::Shell) {
    tracing::warn!(
      backend = %settings.backend,
      "in-memory backend outside `shell`: changes end with this command"
    );
  }
  let mut registry = Registry::new(store);

  match cli.command {
    Command::Shell => commands::shell(&mut registry).await,
    command => commands::run(&mut registry, command).await,
  }
}
