//! CLI runner - executes commands

use crate::analytics::{self, AnalyticsRunner};
use crate::cli::commands::{Cli, Commands, SampleTarget};
use crate::cli::prompt::{ask_config_answers, menu_choice, MenuChoice, Prompt};
use crate::config::{ConfigAnswers, DwhConfig};
use crate::credentials::{read_credentials_csv, AccessKey};
use crate::dataset::SourceBucket;
use crate::error::{Error, Result};
use crate::infra::{AwsProvider, ClusterInfo, InfraManager, InfraSettings};
use crate::loader::{load_errors, CopySources, LoadStats, Loader};
use crate::model::{LogEvent, SongRecord, StarSchema};
use crate::output::{render, render_properties, OutputFormat};
use crate::schema::SchemaManager;
use crate::types::{ClusterStatus, EtlMode};
use crate::warehouse::{RedshiftConnection, ResultSet, ScriptExecutor, SqlExecutor};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

/// Region used for source data when no config file is available
const FALLBACK_REGION: &str = "us-west-2";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Config {
                input,
                defaults,
                force,
            } => self.config(input, *defaults, *force).await,
            Commands::Iac {
                no_wait,
                no_ingress,
            } => self.iac(*no_wait, *no_ingress).await,
            Commands::CreateTables => self.create_tables().await,
            Commands::Etl { yes, test } => self.etl(*yes, *test).await,
            Commands::Analytics { list, query } => self.analytics(*list, *query).await,
            Commands::Status => self.status().await,
            Commands::Pause => self.pause().await,
            Commands::Resume { wait } => self.resume(*wait).await,
            Commands::Cleanup => self.cleanup().await,
            Commands::LoadErrors { limit } => self.load_errors(*limit).await,
            Commands::Sample { target } => self.sample(target).await,
            Commands::Preview {
                events,
                songs,
                max_files,
                rows,
            } => self.preview(events, songs, *max_files, *rows).await,
        }
    }

    fn format(&self) -> OutputFormat {
        self.cli.format
    }

    /// Load the configuration file named on the command line
    fn load_config(&self) -> Result<DwhConfig> {
        DwhConfig::load(&self.cli.config)
    }

    fn save_config(&self, config: &DwhConfig) -> Result<()> {
        config.save(&self.cli.config)?;
        info!(path = %self.cli.config.display(), "Saved configuration");
        Ok(())
    }

    async fn infra(&self, config: &DwhConfig) -> InfraManager<AwsProvider> {
        let provider = AwsProvider::from_config(config).await;
        InfraManager::new(provider, InfraSettings::from_config(config))
    }

    fn print_summary(&self, info: &ClusterInfo) {
        println!("{}", render_properties(&info.summary(), self.format()));
    }

    fn print_statements(&self, statements: &[String]) {
        match self.format() {
            OutputFormat::Table => {
                for statement in statements {
                    println!("{statement};\n");
                }
            }
            OutputFormat::Json => {
                println!("{}", json!(statements));
            }
        }
    }

    // ========================================================================
    // config
    // ========================================================================

    async fn config(&self, input: &Path, defaults: bool, force: bool) -> Result<()> {
        let path = &self.cli.config;
        if path.exists() && !force {
            return Err(Error::config(format!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            )));
        }

        let credentials = read_credentials_csv(input)?;
        let answers = if defaults {
            ConfigAnswers::default()
        } else {
            let Some(answers) = ask_config_answers(&mut Prompt::new()?)? else {
                info!("Configuration cancelled");
                return Ok(());
            };
            answers
        };

        let config = DwhConfig::generate(&credentials, &answers);
        config.validate()?;
        self.save_config(&config)
    }

    // ========================================================================
    // Cluster lifecycle
    // ========================================================================

    async fn iac(&self, no_wait: bool, no_ingress: bool) -> Result<()> {
        let config = self.load_config()?;
        let infra = self.infra(&config).await;

        let role_arn = infra.create().await?;
        let config = config.with_role_arn(role_arn);
        self.save_config(&config)?;

        if no_wait {
            info!(
                cluster = infra.settings().cluster_id(),
                "Cluster creation requested; run `status` to follow it"
            );
            return Ok(());
        }

        let cluster = infra.wait_until_available().await?;
        if let Some(endpoint) = &cluster.endpoint {
            self.save_config(&config.with_host(&endpoint.address))?;
        } else {
            warn!("Available cluster reported no endpoint; db.host left unset");
        }

        if !no_ingress {
            infra.open_port(&cluster).await?;
        }

        self.print_summary(&cluster);
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        let config = self.load_config()?;
        let infra = self.infra(&config).await;

        match infra.status().await? {
            Some(_) => {
                let cluster = infra.describe().await?;
                self.print_summary(&cluster);
            }
            None => println!(
                "Cluster '{}' does not exist",
                infra.settings().cluster_id()
            ),
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let config = self.load_config()?;
        self.infra(&config).await.pause().await?;
        info!(cluster = %config.cluster.identifier, "Pause requested");
        Ok(())
    }

    async fn resume(&self, wait: bool) -> Result<()> {
        let config = self.load_config()?;
        let infra = self.infra(&config).await;
        infra.resume().await?;
        info!(cluster = %config.cluster.identifier, "Resume requested");

        if wait {
            let cluster = infra.wait_until_available().await?;
            self.print_summary(&cluster);
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        let config = self.load_config()?;
        self.infra(&config).await.destroy().await?;
        self.save_config(&config.cleared_provisioning())
    }

    /// Resume a paused cluster before a database command
    async fn ensure_available(&self, config: &DwhConfig) -> Result<()> {
        let infra = self.infra(config).await;
        match infra.status().await? {
            Some(ClusterStatus::Available) => Ok(()),
            Some(ClusterStatus::Paused) => {
                info!(cluster = %config.cluster.identifier, "Cluster is paused; resuming");
                infra.resume().await?;
                infra.wait_until_available().await?;
                Ok(())
            }
            Some(status) => {
                warn!(%status, "Cluster is not available; connecting anyway");
                Ok(())
            }
            None => Err(Error::infra(
                "DescribeClusters",
                format!(
                    "cluster '{}' does not exist; run `iac` first",
                    config.cluster.identifier
                ),
            )),
        }
    }

    // ========================================================================
    // Warehouse
    // ========================================================================

    async fn create_tables(&self) -> Result<()> {
        if self.cli.dry_run {
            let mut script = ScriptExecutor::new();
            SchemaManager::new(&mut script).create_tables().await?;
            self.print_statements(script.statements());
            return Ok(());
        }

        let config = self.load_config()?;
        self.ensure_available(&config).await?;
        let mut conn = RedshiftConnection::connect(&config).await?;
        let created = SchemaManager::new(&mut conn).create_tables().await?;
        conn.close().await?;

        info!(tables = created, "Tables created");
        Ok(())
    }

    async fn etl(&self, yes: bool, test: bool) -> Result<()> {
        let mode = if test { EtlMode::Test } else { EtlMode::Full };
        if mode == EtlMode::Full && !yes && !self.cli.dry_run {
            let mut prompt = Prompt::new()?;
            if !prompt.confirm("Load the full dataset? This can take a long time")? {
                info!("Load cancelled");
                return Ok(());
            }
        }

        let config = self.load_config()?;
        let sources = CopySources::from_config(&config, mode)?;

        if self.cli.dry_run {
            let mut script = ScriptExecutor::new();
            Loader::new(&mut script, sources).run().await?;
            self.print_statements(script.statements());
            return Ok(());
        }

        self.ensure_available(&config).await?;
        let mut conn = RedshiftConnection::connect(&config).await?;
        let stats = Loader::new(&mut conn, sources).run().await?;
        conn.close().await?;

        self.print_load_stats(&stats);
        Ok(())
    }

    fn print_load_stats(&self, stats: &LoadStats) {
        let mut pairs: Vec<(&str, String)> = stats
            .inserted
            .iter()
            .map(|(table, rows)| (table.as_str(), rows.to_string()))
            .collect();
        pairs.push(("staging tables", stats.tables_staged.to_string()));
        pairs.push(("duration ms", stats.duration_ms.to_string()));
        println!("{}", render_properties(&pairs, self.format()));
    }

    async fn analytics(&self, list: bool, number: Option<usize>) -> Result<()> {
        if list {
            for line in analytics::menu() {
                println!("{line}");
            }
            return Ok(());
        }
        if let Some(n) = number {
            analytics::query(n)?;
        }

        let config = self.load_config()?;
        let mut conn = RedshiftConnection::connect(&config).await?;
        match number {
            Some(n) => {
                let result = AnalyticsRunner::new(&mut conn).run(n).await?;
                println!("{}", render(&result, self.format()));
            }
            None => self.analytics_menu(&mut conn).await?,
        }
        conn.close().await
    }

    /// Prompt for query numbers until the user quits
    async fn analytics_menu<E: SqlExecutor>(&self, executor: &mut E) -> Result<()> {
        let mut prompt = Prompt::new()?;
        let mut runner = AnalyticsRunner::new(executor);
        loop {
            println!();
            for line in analytics::menu() {
                println!("{line}");
            }
            let answer = prompt.ask("Query number (q to quit)")?;
            let number = match menu_choice(answer.as_deref()) {
                MenuChoice::Quit => return Ok(()),
                MenuChoice::Invalid(text) => {
                    eprintln!("'{text}' is not a number");
                    continue;
                }
                MenuChoice::Run(number) => number,
            };
            match runner.run(number).await {
                Ok(result) => println!("{}", render(&result, self.format())),
                Err(e) if e.is_config() => eprintln!("{e}"),
                Err(e) => return Err(e),
            }
        }
    }

    async fn load_errors(&self, limit: u32) -> Result<()> {
        let config = self.load_config()?;
        let mut conn = RedshiftConnection::connect(&config).await?;
        let result = load_errors(&mut conn, limit).await?;
        conn.close().await?;

        if result.is_empty() && self.format() == OutputFormat::Table {
            println!("No load errors recorded");
        } else {
            println!("{}", render(&result, self.format()));
        }
        Ok(())
    }

    // ========================================================================
    // Source data
    // ========================================================================

    async fn sample(&self, target: &SampleTarget) -> Result<()> {
        let config = self.load_config()?;
        let credentials = access_key(&config);
        let region = config.s3_region();

        let objects = match target {
            SampleTarget::Songs { prefix, limit } => {
                let (bucket, root) =
                    SourceBucket::open(&config.s3.song_data, region, Some(&credentials))?;
                bucket.song_objects(&root, prefix, *limit).await?
            }
            SampleTarget::Logs { year, month, limit } => {
                let (bucket, root) =
                    SourceBucket::open(&config.s3.log_data, region, Some(&credentials))?;
                bucket.log_objects(&root, *year, *month, *limit).await?
            }
            SampleTarget::Jsonpath => {
                let (bucket, key) =
                    SourceBucket::open(&config.s3.log_jsonpath, region, Some(&credentials))?;
                let document = bucket.read_json(&key).await?;
                println!("{}", serde_json::to_string_pretty(&document)?);
                return Ok(());
            }
        };

        let result = ResultSet::from_records(&["key", "size", "last_modified"], &objects)?;
        println!("{}", render(&result, self.format()));
        Ok(())
    }

    async fn preview(
        &self,
        events: &str,
        songs: &str,
        max_files: usize,
        rows: usize,
    ) -> Result<()> {
        // local sources need no config; S3 sources use its key and region
        let config = DwhConfig::load(&self.cli.config).ok();
        let events: Vec<LogEvent> = read_source(events, config.as_ref(), max_files).await?;
        let songs: Vec<SongRecord> = read_source(songs, config.as_ref(), max_files).await?;
        info!(events = events.len(), songs = songs.len(), "Read source records");

        let star = StarSchema::derive(&events, &songs);
        let tables = star.tables(rows)?;

        match self.format() {
            OutputFormat::Table => {
                let counts: Vec<(&str, String)> = star
                    .counts()
                    .into_iter()
                    .map(|(table, count)| (table, count.to_string()))
                    .collect();
                println!("{}", render_properties(&counts, OutputFormat::Table));
                for (table, result) in &tables {
                    println!("\n{table}");
                    println!("{}", render(result, OutputFormat::Table));
                }
            }
            OutputFormat::Json => {
                let counts: serde_json::Map<String, serde_json::Value> = star
                    .counts()
                    .into_iter()
                    .map(|(table, count)| (table.to_string(), json!(count)))
                    .collect();
                let rows: serde_json::Map<String, serde_json::Value> = tables
                    .iter()
                    .map(|(table, result)| ((*table).to_string(), result.to_json()))
                    .collect();
                let document = json!({ "counts": counts, "rows": rows });
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
        }
        Ok(())
    }
}

fn access_key(config: &DwhConfig) -> AccessKey {
    AccessKey {
        key: config.aws.key.clone(),
        secret: config.aws.secret.clone(),
    }
}

/// Read every record under an `s3://` URL, local file or directory
async fn read_source<T: DeserializeOwned>(
    location: &str,
    config: Option<&DwhConfig>,
    max_files: usize,
) -> Result<Vec<T>> {
    let region = config.map_or(FALLBACK_REGION, DwhConfig::s3_region);
    let credentials = config.map(access_key);
    let (bucket, key) = SourceBucket::open(location, region, credentials.as_ref())?;
    bucket.read_all_records(&key, max_files).await
}
