//! CLI runner - executes discovery or sync

use crate::catalog::{self, Catalog};
use crate::cli::commands::{Cli, Mode};
use crate::client::GoCardlessClient;
use crate::config::TapConfig;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::Result;
use crate::output::JsonLinesSink;
use crate::schema::SchemaLoader;
use crate::state::SyncState;
use std::io::Write;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run against stdout
    pub async fn run(&self) -> Result<()> {
        self.run_to(std::io::stdout()).await?;
        Ok(())
    }

    /// Run, writing all protocol output to `out`
    pub async fn run_to<W: Write + Send>(&self, out: W) -> Result<W> {
        let config = TapConfig::from_file(&self.cli.config)?;
        info!(environment = %config.environment, mode = ?self.cli.mode(), "Starting tap");

        match self.cli.mode() {
            Mode::Discover => self.discover(out),
            Mode::Sync => self.sync(&config, out).await,
        }
    }

    fn schema_loader(&self) -> SchemaLoader {
        match &self.cli.schemas_dir {
            Some(dir) => SchemaLoader::from_dir(dir),
            None => SchemaLoader::bundled(),
        }
    }

    /// Print the discovered catalog as pretty JSON
    fn discover<W: Write>(&self, mut out: W) -> Result<W> {
        let catalog = catalog::discover(&self.schema_loader())?;
        writeln!(out, "{}", catalog.to_json_pretty()?)?;
        out.flush()?;
        info!(streams = catalog.len(), "Discovery complete");
        Ok(out)
    }

    /// The `--catalog` file, or a discovered catalog with everything selected
    fn load_catalog(&self) -> Result<Catalog> {
        match &self.cli.catalog {
            Some(path) => Catalog::from_file(path),
            None => {
                info!("No catalog given, syncing every stream");
                let mut catalog = catalog::discover(&self.schema_loader())?;
                catalog.select_all();
                Ok(catalog)
            }
        }
    }

    fn load_state(&self) -> Result<SyncState> {
        match &self.cli.state {
            Some(path) => SyncState::from_file(path),
            None => Ok(SyncState::new()),
        }
    }

    async fn sync<W: Write + Send>(&self, config: &TapConfig, out: W) -> Result<W> {
        let catalog = self.load_catalog()?;
        let mut state = self.load_state()?;

        let client = GoCardlessClient::new(config)?;
        let mut engine = SyncEngine::new(
            client.registry(),
            JsonLinesSink::new(out),
            SyncConfig::from(config),
        );

        engine.sync(&catalog, &mut state).await?;

        let sink = engine.into_sink();
        debug!(messages = sink.written(), "Singer output written");
        Ok(sink.into_inner())
    }
}
