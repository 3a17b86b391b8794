use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tabula_core::{DialectConfig, MappingConfig, SqlDialect, TableMetadata};
use tabula_entity::{properties, AnnotationKind, AnnotationResolver, Column, EntityCatalog, EntityType};
use tabula_mapping::{process, table_name, TypeRegistry};

/// Tabula - resolve entity annotations into relational table metadata
#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: tabula.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQL dialect, overrides the config file
    #[arg(short, long, global = true)]
    dialect: Option<DialectConfig>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map entities onto tables and print the resolved metadata
    Map {
        /// Entity document (TOML or JSON)
        file: PathBuf,

        /// Entities to map (all if not specified)
        #[arg(short, long)]
        entity: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the properties of an entity and their resolved annotations
    Properties {
        /// Entity document (TOML or JSON)
        file: PathBuf,

        /// Entity name
        #[arg(short, long)]
        entity: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    tracing::debug!(dialect = ?config.dialect, codec_policy = ?config.codec_policy, "configuration loaded");

    match cli.command {
        Commands::Map { file, entity, format, output } => {
            map_command(&config, &file, &entity, format, output.as_deref())
        }
        Commands::Properties { file, entity, format } => {
            properties_command(&file, &entity, format)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MappingConfig> {
    if let Some(path) = path {
        return MappingConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = Path::new("tabula.toml");
    if default_path.exists() {
        Ok(MappingConfig::from_file(default_path)?)
    } else {
        tracing::debug!("no config file found, using defaults");
        Ok(MappingConfig::default())
    }
}

fn load_catalog(file: &Path) -> Result<EntityCatalog> {
    let catalog = EntityCatalog::from_file(file)
        .with_context(|| format!("Failed to load entities from {}", file.display()))?;
    tracing::info!(entities = catalog.len(), file = %file.display(), "loaded entity document");
    Ok(catalog)
}

fn find_entity<'c>(catalog: &'c EntityCatalog, name: &str) -> Result<&'c Arc<EntityType>> {
    catalog
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("Entity '{}' not found in document", name))
}

/// Map command - resolve tables for all or selected entities
fn map_command(
    config: &MappingConfig,
    file: &Path,
    selected: &[String],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(file)?;

    let entities: Vec<&Arc<EntityType>> = if selected.is_empty() {
        catalog.entities().collect()
    } else {
        selected
            .iter()
            .map(|name| find_entity(&catalog, name))
            .collect::<Result<_>>()?
    };

    let registry = TypeRegistry::with_builtins();
    let dialect = Arc::new(SqlDialect::from_config(&config.dialect));

    let mut tables = Vec::with_capacity(entities.len());
    for entity in entities {
        let mut table = TableMetadata::new(table_name(entity), dialect.clone());
        process(entity, &mut table, &registry, config)
            .with_context(|| format!("Failed to map entity '{}'", entity.name()))?;
        tables.push(table);
    }

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&tables)?,
        OutputFormat::Text => tables.iter().map(render_table).collect::<Vec<_>>().join("\n"),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", "Tables written to:".green(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render_table(table: &TableMetadata) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", table.name.bold()));

    for column in table.columns() {
        let mut flags = Vec::new();
        if column.primary_key {
            flags.push("pk".yellow().to_string());
        }
        if column.not_null {
            flags.push("not null".to_string());
        }
        if !column.updatable {
            flags.push("read-only".dimmed().to_string());
        }

        out.push_str(&format!(
            "  {:<24} {:<20} {:<10} {}\n",
            column.name.cyan(),
            column.sql_type.as_deref().unwrap_or("?"),
            column.codec_name().unwrap_or("-"),
            flags.join(", ")
        ));
    }

    for index in table.indexes() {
        let columns: Vec<String> = index
            .columns
            .iter()
            .map(|c| format!("{} {}", c.column, c.sort))
            .collect();
        let kind = if index.unique { "unique index" } else { "index" };
        out.push_str(&format!("  {} {} ({})\n", kind.magenta(), index.name, columns.join(", ")));
    }

    for mapping in table.mappings() {
        for key in mapping.foreign_keys() {
            let property = mapping.property_for_column(key).unwrap_or("?");
            out.push_str(&format!("  {} {} -> {}\n", "external".dimmed(), key, property));
        }
    }

    out
}

/// One property row of the `properties` command
#[derive(Debug, Serialize)]
struct PropertyRow {
    name: String,
    host_type: String,
    read: Option<String>,
    write: Option<String>,
    column: Option<String>,
    annotations: Vec<&'static str>,
}

const PROPERTY_KINDS: [AnnotationKind; 5] = [
    AnnotationKind::Column,
    AnnotationKind::Type,
    AnnotationKind::Id,
    AnnotationKind::JoinColumn,
    AnnotationKind::JoinColumns,
];

/// Properties command - show introspected properties and resolved annotations
fn properties_command(file: &Path, entity_name: &str, format: OutputFormat) -> Result<()> {
    let catalog = load_catalog(file)?;
    let entity = find_entity(&catalog, entity_name)?;
    let resolver = AnnotationResolver::new();

    let rows: Vec<PropertyRow> = properties(entity)
        .iter()
        .map(|property| PropertyRow {
            name: property.name.clone(),
            host_type: property.host_type.to_string(),
            read: property.read.map(|m| format!("{}.{}", m.declaring.name(), m.name())),
            write: property.write.map(|m| format!("{}.{}", m.declaring.name(), m.name())),
            column: resolver
                .resolve::<Column>(entity, property)
                .map(|c| c.name().unwrap_or(&property.name).to_string()),
            annotations: PROPERTY_KINDS
                .iter()
                .filter(|kind| resolver.resolve_kind(entity, property, **kind).is_some())
                .map(AnnotationKind::as_str)
                .collect(),
        })
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} {}", "Entity".bold(), entity.name().cyan());
    for row in &rows {
        let annotations = if row.annotations.is_empty() {
            "(unmapped)".dimmed().to_string()
        } else {
            row.annotations.join(", ")
        };
        println!("  {:<20} {:<12} {}", row.name.green(), row.host_type, annotations);
        if let Some(column) = &row.column {
            println!("    {} {}", "column:".dimmed(), column);
        }
        if let Some(read) = &row.read {
            println!("    {} {}", "read:".dimmed(), read);
        }
        if let Some(write) = &row.write {
            println!("    {} {}", "write:".dimmed(), write);
        }
    }

    Ok(())
}
