mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tome_codec::{Codec, CodeFamily};
use tome_config::Config;
use tome_fetch::{GoogleBooks, MetadataSource};
use tome_library::{Import, render_code, resolve, scan_code};
use tome_storage::backend::LocalBackend;
use tome_store::{Database, RelatedKind, RelationshipStore, Repository};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON), merged over user config.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the remote metadata source.
    Search { query: String },
    /// Import a remote record by its external id.
    Import { external_id: String },
    /// Look up a book by the identifier printed in its code.
    Resolve { identifier: String },
    /// Store a code image for a book and print where it is.
    Encode {
        identifier: String,
        #[arg(long, short, default_value = "matrix", value_parser = parse_family)]
        family: CodeFamily,
    },
    /// Decode a code from an image file and look the book up.
    Scan {
        image: PathBuf,
        #[arg(long, short, default_value = "matrix", value_parser = parse_family)]
        family: CodeFamily,
    },
}

fn parse_family(s: &str) -> std::result::Result<CodeFamily, String> {
    s.parse::<CodeFamily>().map_err(|err| (*err).to_string())
}

struct App {
    config: Config,
    db: Database,
    store: Repository,
    codec: Codec,
}

impl App {
    async fn open(config: Config) -> Result<Self> {
        let db = Database::connect(&config.database.path, Some(config.database.max_connections))
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(path = %config.database.path.display(), "catalog opened");
        let store = Repository::from(&db);
        let codec = Codec::new(config.locator);
        Ok(Self { config, db, store, codec })
    }

    fn remote(&self) -> Result<GoogleBooks> {
        let remote = &self.config.remote;
        GoogleBooks::new(&remote.endpoint, remote.api_key.clone(), remote.timeout()).or_raise(|| ErrorKind::Remote)
    }

    fn backend(&self) -> Result<LocalBackend> {
        open_backend(&self.config.storage.root)
    }

    async fn run(&self, command: Command) -> Result<Value> {
        match command {
            Command::Search { query } => {
                let records: Vec<_> =
                    self.remote()?.search(&query).await.or_raise(|| ErrorKind::Command("search"))?.collect();
                Ok(json!(records))
            },
            Command::Import { external_id } => {
                let import = tome_library::import_by_external_id(&self.remote()?, &self.store, &external_id)
                    .await
                    .or_raise(|| ErrorKind::Command("import"))?;
                self.describe_import(import).await
            },
            Command::Resolve { identifier } => {
                let resolution = resolve(&self.store, &identifier).await.or_raise(|| ErrorKind::Command("resolve"))?;
                Ok(json!(resolution))
            },
            Command::Encode { identifier, family } => {
                let backend = self.backend()?;
                let rendered = render_code(&self.codec, &self.store, &backend, &identifier, family)
                    .await
                    .or_raise(|| ErrorKind::Command("render"))?;
                let mut value = json!(rendered);
                if let Some(path) = rendered.path() {
                    let absolute = backend.absolute_path(path).or_raise(|| ErrorKind::Storage)?;
                    value["absolute_path"] = json!(absolute);
                }
                Ok(value)
            },
            Command::Scan { image, family } => {
                let bytes = tokio::fs::read(&image)
                    .await
                    .or_raise(|| ErrorKind::Input(image.display().to_string()))?;
                let scanned =
                    scan_code(&self.codec, &self.store, bytes, family).await.or_raise(|| ErrorKind::Command("scan"))?;
                Ok(json!(scanned))
            },
        }
    }

    async fn describe_import(&self, import: Import) -> Result<Value> {
        let outcome = match &import {
            Import::Created(_) => "created",
            Import::AlreadyImported(_) => "already_imported",
            Import::PartialFailure { .. } => "partial_failure",
        };
        let book = import.book();
        let authors = self.store.list_related(book.id, RelatedKind::Author).await.or_raise(|| ErrorKind::Command("import"))?;
        let categories =
            self.store.list_related(book.id, RelatedKind::Category).await.or_raise(|| ErrorKind::Command("import"))?;
        let failed: Vec<_> = match &import {
            Import::PartialFailure { failed, .. } => failed
                .iter()
                .map(|link| json!({ "kind": link.kind, "key": link.key, "error": (*link.error).to_string() }))
                .collect(),
            _ => Vec::new(),
        };
        Ok(json!({
            "outcome": outcome,
            "book": book,
            "authors": authors.into_iter().map(|related| related.key).collect::<Vec<_>>(),
            "categories": categories.into_iter().map(|related| related.key).collect::<Vec<_>>(),
            "failed": failed,
        }))
    }
}

/// Relative roots are taken from the working directory.
fn open_backend(root: &Path) -> Result<LocalBackend> {
    let root = std::path::absolute(root).or_raise(|| ErrorKind::Storage)?;
    LocalBackend::new("local", root).or_raise(|| ErrorKind::Storage)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = async {
        let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        let app = App::open(config).await?;
        let value = app.run(cli.command).await;
        app.db.close().await;
        value
    }
    .await;

    match outcome {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            },
            Err(err) => {
                eprintln!("could not serialize output: {err}");
                ExitCode::FAILURE
            },
        },
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["tome", "scan", "cover.jpg", "--family", "barcode"]).unwrap();
        assert!(matches!(cli.command, Command::Scan { family: CodeFamily::Linear, .. }));

        let cli = Cli::try_parse_from(["tome", "encode", "7", "-c", "tome.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("tome.toml")));
        assert!(matches!(cli.command, Command::Encode { family: CodeFamily::Matrix, .. }));

        assert!(Cli::try_parse_from(["tome", "encode", "7", "--family", "pdf417"]).is_err());
    }

    #[test]
    fn test_open_backend() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("codes");
        let backend = open_backend(&root).unwrap();
        assert_eq!(backend.root(), root);
        assert!(root.is_dir());
        assert_eq!(backend.absolute_path("qrcode7.png").unwrap(), root.join("qrcode7.png"));
    }

    #[test]
    fn test_open_backend_rejects_empty_root() {
        let err = open_backend(Path::new("")).unwrap_err();
        assert_eq!(*err, ErrorKind::Storage);
    }
}
