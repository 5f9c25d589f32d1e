//! flexql CLI
//!
//! Compiles JSON query and mutation descriptions into SQL for a chosen
//! database product. Nothing is executed.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use flexql_core::ast::{QueryDescription, Row, TableRef};
use flexql_core::{CompileOptions, CompiledStatement, Compiler, DbType, PageRequest, TableMeta};

/// Dialect-aware SQL compiler.
#[derive(Parser)]
#[command(name = "flexql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target database product.
    #[arg(short, long, env = "FLEXQL_DIALECT", default_value = "postgresql")]
    dialect: DbType,

    /// JSON file mapping entity names to table metadata.
    #[arg(short, long, env = "FLEXQL_METADATA")]
    metadata: Option<PathBuf>,

    /// Fail on unresolved tables instead of rendering an empty name.
    #[arg(long)]
    strict_metadata: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a SELECT from a query description.
    Select {
        /// Query description (JSON).
        query: PathBuf,
    },

    /// Compile the count statement of a query.
    Count {
        /// Query description (JSON).
        query: PathBuf,

        /// Always wrap the query in a subquery.
        #[arg(long)]
        no_optimize: bool,
    },

    /// Compile the records and count statements of one page.
    Page {
        /// Query description (JSON).
        query: PathBuf,

        /// 1-based page number.
        #[arg(short, long, default_value_t = 1)]
        number: u64,

        /// Rows per page.
        #[arg(short, long, default_value_t = 10)]
        size: u64,
    },

    /// Compile a DELETE from a query description.
    Delete {
        /// Query description (JSON).
        query: PathBuf,

        /// Entity whose table is used when the query has no FROM.
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Compile a multi-row INSERT using the first row's columns.
    InsertBatch {
        /// Target table.
        table: String,

        /// JSON array of rows.
        rows: PathBuf,

        /// Schema of the target table.
        #[arg(long)]
        schema: Option<String>,
    },

    /// Compile an entity INSERT from one row.
    Insert {
        /// Entity name in the metadata file.
        entity: String,

        /// Row (JSON object).
        row: PathBuf,

        /// Leave out columns whose value is NULL.
        #[arg(long)]
        ignore_nulls: bool,
    },

    /// Compile an UPDATE by primary key from one row.
    UpdateById {
        /// Entity name in the metadata file.
        entity: String,

        /// Row (JSON object) carrying the key columns.
        row: PathBuf,

        /// Leave out columns whose value is NULL.
        #[arg(long)]
        ignore_nulls: bool,
    },

    /// List the built-in dialects.
    Dialects,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let metadata: HashMap<String, TableMeta> = match &cli.metadata {
        Some(path) => read_json(path)?,
        None => HashMap::new(),
    };
    debug!(entities = metadata.len(), "loaded metadata");

    let dialect = cli.dialect.dialect();
    let options = if cli.strict_metadata {
        CompileOptions::strict()
    } else {
        CompileOptions::default()
    };
    let compiler = Compiler::new(&dialect)
        .with_metadata(&metadata)
        .with_options(options);

    match cli.command {
        Commands::Select { query } => {
            let query: QueryDescription = read_json(&query)?;
            print_statement(&compiler.select_by_query(&query)?)?;
        }

        Commands::Count { query, no_optimize } => {
            let query: QueryDescription = read_json(&query)?;
            let stmt = if no_optimize {
                compiler.subquery_count(&query)?
            } else {
                compiler.select_count_by_query(&query)?
            };
            print_statement(&stmt)?;
        }

        Commands::Page {
            query,
            number,
            size,
        } => {
            let query: QueryDescription = read_json(&query)?;
            let page = compiler.paginate(&query, PageRequest::new(number, size))?;
            print_statement(&page.records)?;
            print_statement(&page.count)?;
        }

        Commands::Delete { query, entity } => {
            let query: QueryDescription = read_json(&query)?;
            let stmt = match entity {
                Some(entity) => compiler.delete_by_query_for(&entity, &query)?,
                None => compiler.delete_by_query(&query)?,
            };
            print_statement(&stmt)?;
        }

        Commands::InsertBatch {
            table,
            rows,
            schema,
        } => {
            let rows: Vec<Row> = read_json(&rows)?;
            let table = match schema {
                Some(schema) => TableRef::new(table).schema(schema),
                None => TableRef::new(table),
            };
            let statements = compiler.insert_batch_with_first_row_columns(&table, &rows)?;
            info!(
                rows = rows.len(),
                statements = statements.len(),
                "compiled batch insert"
            );
            for stmt in &statements {
                print_statement(stmt)?;
            }
        }

        Commands::Insert {
            entity,
            row,
            ignore_nulls,
        } => {
            let row: Row = read_json(&row)?;
            print_statement(&compiler.insert_entity(&entity, &row, ignore_nulls)?)?;
        }

        Commands::UpdateById {
            entity,
            row,
            ignore_nulls,
        } => {
            let row: Row = read_json(&row)?;
            print_statement(&compiler.update_entity_by_id(&entity, &row, ignore_nulls)?)?;
        }

        Commands::Dialects => {
            for db in DbType::ALL {
                let dialect = db.dialect();
                println!(
                    "{:<14} wrap={:?} limit={:?} batch={:?}",
                    db.name(),
                    dialect.wrap_policy(),
                    dialect.limit_strategy(),
                    dialect.batch_style()
                );
            }
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Writes the SQL line and the JSON parameter line to stdout. Logs go to
/// stderr so the two lines stay adjacent.
fn print_statement(stmt: &CompiledStatement) -> anyhow::Result<()> {
    write_statement(&mut io::stdout().lock(), stmt)
}

fn write_statement(out: &mut impl Write, stmt: &CompiledStatement) -> anyhow::Result<()> {
    writeln!(out, "{}", stmt.sql())?;
    writeln!(out, "{}", serde_json::to_string(stmt.params())?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use flexql_core::ast::{col, ExprOps};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dialect_argument() {
        let cli =
            Cli::try_parse_from(["flexql", "--dialect", "sqlserver-2005", "dialects"]).unwrap();
        assert_eq!(cli.dialect, DbType::SqlServer2005);
        assert!(Cli::try_parse_from(["flexql", "--dialect", "nosuchdb", "dialects"]).is_err());
    }

    #[test]
    fn test_statement_output_is_two_lines() {
        let dialect = DbType::PostgreSql.dialect();
        let query = QueryDescription::new()
            .from(TableRef::new("tb_account"))
            .where_clause(col("user_name").eq("michael"));
        let stmt = Compiler::new(&dialect).select_by_query(&query).unwrap();
        let mut out = Vec::new();
        write_statement(&mut out, &stmt).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "SELECT * FROM \"tb_account\" WHERE \"user_name\" = ?\n[\"michael\"]\n"
        );
    }
}
