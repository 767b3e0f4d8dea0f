//! schema2orm CLI - generate .NET ORM mappings from a PostgreSQL schema.

use clap::{Parser, Subcommand};
use schema2orm::{
    Config, ConventionFormatter, EntityGenerator, GeneratedCode, Language, MappingGenerator,
    MappingStyle, MetadataReader, PostgresMetadataReader, Preferences, SchemaMapError, Table,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "schema2orm")]
#[command(about = "Generate .NET ORM mapping classes from a PostgreSQL schema")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "schema2orm.yaml")]
    config: PathBuf,

    /// libpq-style connection string, used instead of the config connection
    #[arg(long)]
    connection: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schemas (owners)
    Owners,

    /// List base tables in a schema
    Tables {
        /// Schema to list [default: configured schema]
        #[arg(long)]
        schema: Option<String>,
    },

    /// List sequences, or find the sequence behind one column
    Sequences {
        /// Schema to search [default: configured schema]
        #[arg(long)]
        schema: Option<String>,

        /// Table owning the column
        #[arg(long, requires = "column")]
        table: Option<String>,

        /// Identity column to resolve
        #[arg(long, requires = "table")]
        column: Option<String>,
    },

    /// Show a table's columns, keys and relationships
    Describe {
        /// Table to describe
        #[arg(long)]
        table: String,

        /// Schema of the table [default: configured schema]
        #[arg(long)]
        schema: Option<String>,
    },

    /// Generate the mapping class (and optionally the entity) for a table
    Generate {
        /// Table to generate for
        #[arg(long)]
        table: String,

        /// Schema of the table [default: configured schema]
        #[arg(long)]
        schema: Option<String>,

        /// Mapping style: by-code, fluent or dapper-fluent
        #[arg(long)]
        style: Option<String>,

        /// Output language: csharp or vb
        #[arg(long)]
        language: Option<String>,

        /// Sequence generating the primary key
        #[arg(long, conflicts_with = "detect_sequence")]
        sequence: Option<String>,

        /// Look up the sequence behind the primary key
        #[arg(long)]
        detect_sequence: bool,

        /// Also generate the entity class
        #[arg(long)]
        entity: bool,

        /// Directory to write one file per class into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Reader plus the preferences and default schema it was configured with.
struct Session {
    reader: PostgresMetadataReader,
    preferences: Preferences,
    schema: String,
}

fn open_session(cli: &Cli) -> Result<Session, SchemaMapError> {
    if let Some(ref conn_str) = cli.connection {
        let reader = PostgresMetadataReader::from_connection_string(conn_str)?;
        // The config file only contributes preferences here.
        let preferences = if cli.config.exists() {
            Config::load(&cli.config)?.preferences
        } else {
            Preferences::default()
        };
        return Ok(Session {
            reader,
            preferences,
            schema: "public".to_string(),
        });
    }

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);
    Ok(Session {
        reader: PostgresMetadataReader::new(&config.connection)?,
        schema: config.connection.schema.clone(),
        preferences: config.preferences,
    })
}

async fn run() -> Result<(), SchemaMapError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let session = open_session(&cli)?;
    let reader = &session.reader;

    match cli.command {
        Commands::Owners => {
            let owners = reader.get_owners().await?;
            print_list(&owners, cli.output_json)?;
        }

        Commands::Tables { ref schema } => {
            let schema = schema.as_deref().unwrap_or(&session.schema);
            let tables = reader.get_tables(schema).await?;
            print_list(&tables, cli.output_json)?;
        }

        Commands::Sequences {
            ref schema,
            ref table,
            ref column,
        } => {
            let schema = schema.as_deref().unwrap_or(&session.schema);
            match (table, column) {
                (Some(table), Some(column)) => {
                    let sequence = reader.get_sequence_for_column(schema, table, column).await?;
                    if cli.output_json {
                        println!("{}", serde_json::to_string_pretty(&sequence)?);
                    } else {
                        match sequence {
                            Some(name) => println!("{}", name),
                            None => {
                                println!("No sequence found for {}.{}.{}", schema, table, column)
                            }
                        }
                    }
                }
                _ => {
                    let sequences = reader.get_sequences(schema).await?;
                    print_list(&sequences, cli.output_json)?;
                }
            }
        }

        Commands::Describe {
            ref table,
            ref schema,
        } => {
            let schema = schema.as_deref().unwrap_or(&session.schema);
            let details = reader.get_table_details(schema, table).await?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print_table(&details);
            }
        }

        Commands::Generate {
            ref table,
            ref schema,
            ref style,
            ref language,
            ref sequence,
            detect_sequence,
            entity,
            ref output,
        } => {
            let schema = schema.as_deref().unwrap_or(&session.schema);
            let mut prefs = session.preferences.clone();

            // Apply overrides
            if let Some(style) = style {
                prefs.style = style.parse::<MappingStyle>().map_err(SchemaMapError::Config)?;
            }
            if let Some(language) = language {
                prefs.language = language.parse::<Language>().map_err(SchemaMapError::Config)?;
            }

            let details = reader.get_table_details(schema, table).await?;

            if let Some(sequence) = sequence {
                prefs.sequence = Some(sequence.clone());
            } else if detect_sequence {
                prefs.sequence = detect_key_sequence(reader, schema, &details).await?;
            }

            let formatter = ConventionFormatter::from_preferences(&prefs);
            let mut generated = vec![MappingGenerator::new(&prefs, &formatter).generate(&details)?];
            if entity {
                generated.push(EntityGenerator::new(&prefs, &formatter).generate(&details)?);
            }

            match output {
                Some(dir) => write_files(dir, &generated)?,
                None if cli.output_json => {
                    println!("{}", serde_json::to_string_pretty(&generated)?);
                }
                None => {
                    for code in &generated {
                        print!("{}", code.code);
                    }
                }
            }
        }

        Commands::HealthCheck => {
            let start = Instant::now();
            reader.ping().await?;
            let latency_ms = start.elapsed().as_millis() as u64;

            if cli.output_json {
                let result = serde_json::json!({
                    "healthy": true,
                    "db_type": reader.db_type(),
                    "latency_ms": latency_ms,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!("  Database ({}): OK ({}ms)", reader.db_type(), latency_ms);
            }
        }
    }

    Ok(())
}

/// Sequence behind a single-column primary key, if the table has one.
async fn detect_key_sequence(
    reader: &PostgresMetadataReader,
    schema: &str,
    table: &Table,
) -> Result<Option<String>, SchemaMapError> {
    let key_column = match &table.primary_key {
        Some(pk) if table.has_single_pk() => pk.columns.first(),
        _ => None,
    };
    match key_column {
        Some(column) => {
            let sequence = reader
                .get_sequence_for_column(schema, &table.name, &column.name)
                .await?;
            info!("Detected sequence {:?} for {}.{}", sequence, table.name, column.name);
            Ok(sequence)
        }
        None => Ok(None),
    }
}

fn write_files(dir: &Path, generated: &[GeneratedCode]) -> Result<(), SchemaMapError> {
    std::fs::create_dir_all(dir)?;
    for code in generated {
        let path = dir.join(&code.file_name);
        std::fs::write(&path, &code.code)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn print_list(items: &[String], json: bool) -> Result<(), SchemaMapError> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

fn print_table(table: &Table) {
    println!("Table: {}", table.full_name());
    println!("  Columns:");
    for column in &table.columns {
        let mut flags = Vec::new();
        if column.is_primary_key {
            flags.push("PK");
        }
        if column.is_foreign_key {
            flags.push("FK");
        }
        if column.is_identity {
            flags.push("identity");
        }
        if column.is_unique {
            flags.push("unique");
        }
        if !column.is_nullable {
            flags.push("not null");
        }
        println!("    {} {} [{}]", column.name, column.data_type, flags.join(", "));
    }

    if let Some(ref pk) = table.primary_key {
        let columns: Vec<&str> = pk.columns.iter().map(|c| c.name.as_str()).collect();
        println!("  Primary key ({:?}): {}", pk.kind, columns.join(", "));
    }
    for fk in &table.foreign_keys {
        let columns: Vec<&str> = fk.columns.iter().map(|c| c.name.as_str()).collect();
        println!("  Foreign key {}: ({}) -> {}", fk.name, columns.join(", "), fk.references);
    }
    for has_many in &table.has_many {
        println!(
            "  Has many: {} via {}",
            has_many.reference, has_many.reference_column
        );
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so generated code on stdout stays clean.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
