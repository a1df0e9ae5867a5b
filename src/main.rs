use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use gqlbridge::entity_catalog::EntityModelConfig;
use gqlbridge::executor::QueryExecutor;
use gqlbridge::query_schema::QuerySchema;
use gqlbridge::scalars::{self, ScalarBinding};
use gqlbridge::store::{ClickHouseStore, EntityStore, MemoryStore};
use gqlbridge::{config, server};
use serde_json::Value;

/// gqlbridge - select/where query documents over a relational entity store
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTTP server host address
    #[arg(long, default_value = "0.0.0.0")]
    http_host: String,

    /// HTTP server port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// YAML entity model to build the query schema from
    #[arg(long, default_value = "entity_model.yaml")]
    entity_model: String,

    /// Cap on joined rows per root field; larger results fail that root
    #[arg(long)]
    max_result_rows: Option<u64>,

    /// Seconds before a request is aborted
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Read server configuration from a YAML file instead of the flags above
    #[arg(long, conflicts_with = "from_env")]
    config: Option<String>,

    /// Read server configuration from GQLBRIDGE_* environment variables
    #[arg(long)]
    from_env: bool,

    /// JSON file of entities (`{"Entity": [{..}, ..]}`) loaded into the
    /// in-memory store when no ClickHouse connection is configured
    #[arg(long)]
    seed: Option<String>,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            http_host: cli.http_host.clone(),
            http_port: cli.http_port,
            entity_model_path: cli.entity_model.clone(),
            max_result_rows: cli.max_result_rows,
            request_timeout_secs: cli.request_timeout,
        }
    }
}

fn register_payload_scalars() {
    scalars::register(
        "JsonNode",
        ScalarBinding::opaque("Json", "Json type").with_containment(),
    );
    scalars::register(
        "VariableValue",
        ScalarBinding::opaque("VariableValue", "VariableValue type"),
    );
}

fn load_schema(entity_model_path: &str) -> anyhow::Result<QuerySchema> {
    let model = EntityModelConfig::from_yaml_file(entity_model_path)
        .with_context(|| format!("loading entity model {}", entity_model_path))?;
    let descriptors = model.to_descriptors()?;
    let name = Path::new(entity_model_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("default")
        .to_string();
    let schema = QuerySchema::build(name, descriptors, scalars::global_registry())?;
    Ok(schema)
}

fn seed_memory_store(store: &MemoryStore, schema: &QuerySchema, path: &str) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading seed file {}", path))?;
    let Value::Object(entities) = serde_json::from_str::<Value>(&content)? else {
        bail!("seed file {} must contain an object keyed by entity name", path);
    };
    for (entity, rows) in &entities {
        let Value::Array(rows) = rows else {
            bail!("seed entries for {} must be a list", entity);
        };
        for row in rows {
            store.insert_entity(schema, entity, row)?;
        }
        log::info!("Seeded {} {} rows", rows.len(), entity);
    }
    Ok(())
}

fn build_store(schema: &QuerySchema, seed: Option<&str>) -> anyhow::Result<Arc<dyn EntityStore>> {
    if let Some(store) = ClickHouseStore::from_env() {
        if seed.is_some() {
            log::warn!("Ignoring --seed: a ClickHouse connection is configured");
        }
        return Ok(Arc::new(store));
    }

    log::warn!("ClickHouse client could not be created (missing CLICKHOUSE_* env vars?)");
    log::warn!("Serving queries from the in-memory store");
    let store = MemoryStore::new();
    if let Some(path) = seed {
        seed_memory_store(&store, schema, path)?;
    }
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    log::info!("gqlbridge v{}", env!("CARGO_PKG_VERSION"));

    let config = match (&cli.config, cli.from_env) {
        (Some(path), _) => config::ServerConfig::from_yaml_file(path),
        (None, true) => config::ServerConfig::from_env(),
        (None, false) => config::ServerConfig::from_cli((&cli).into()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    register_payload_scalars();

    let schema = match load_schema(&config.entity_model_path) {
        Ok(schema) => Arc::new(schema),
        Err(e) => {
            log::error!("Failed to build query schema: {:#}", e);
            std::process::exit(1);
        }
    };
    log::info!("Query roots: {}", schema.root_names().join(", "));

    let store = match build_store(&schema, cli.seed.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to prepare entity store: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut executor = QueryExecutor::new(schema, store);
    if let Some(limit) = config.max_result_rows {
        executor = executor.with_max_result_rows(limit);
    }

    server::run_with_config(config, executor).await;
}
