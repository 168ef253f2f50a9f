//! oxide-mysql-diff CLI
//!
//! Command-line tool for splitting SQL files and diffing schema snapshots.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_mysql_core::parser::{parse_statements, parse_statements_in_file, Statement};
use oxide_mysql_core::{Flavor, SchemaDiff};
use oxide_mysql_diff::{load_schema, prepare, write_script, ModifierArgs};

/// Schema diff and DDL generation for MySQL and MariaDB.
#[derive(Parser)]
#[command(name = "oxide-mysql-diff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a SQL file into statements.
    Split {
        /// SQL file to read, or `-` for stdin.
        file: PathBuf,

        /// Print statement records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the DDL turning one schema snapshot into another.
    Diff {
        /// Snapshot of the current schema.
        from: PathBuf,

        /// Snapshot of the desired schema.
        to: PathBuf,

        /// Run the introspection fixups on both snapshots first.
        #[arg(long)]
        fixup: bool,

        #[command(flatten)]
        modifiers: ModifierArgs,
    },

    /// Show how a flavor string is interpreted.
    Flavor {
        /// Flavor such as `mysql:8.0.34`, `mariadb:10.11` or `percona:5.7`.
        flavor: Flavor,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Split { file, json } => {
            let statements = if file.as_os_str() == "-" {
                parse_statements(io::stdin().lock(), "")?
            } else {
                parse_statements_in_file(&file)?
            };
            print_statements(&statements, json)?;
        }

        Commands::Diff {
            from,
            to,
            fixup,
            modifiers,
        } => {
            let mods = modifiers.modifiers()?;
            let mut from_schema = load_schema(&from)?;
            let mut to_schema = load_schema(&to)?;
            if fixup {
                prepare(&mut from_schema, mods.flavor);
                prepare(&mut to_schema, mods.flavor);
            }

            let diff = SchemaDiff::new(Some(&from_schema), Some(&to_schema));
            let mut stdout = io::stdout().lock();
            let summary = write_script(&mut stdout, &diff, &mods)?;
            stdout.flush()?;
            if !summary.is_complete() {
                info!(
                    "{} statement(s) withheld; use --allow-unsafe to emit them",
                    summary.withheld
                );
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Flavor { flavor } => {
            println!("flavor:                 {flavor}");
            println!("known:                  {}", flavor.known());
            println!("too new:                {}", flavor.too_new());
            println!("generated columns:      {}", flavor.generated_columns());
            println!("sorted foreign keys:    {}", flavor.sorted_foreign_keys());
            println!("omit int display width: {}", flavor.omit_int_display_width());
            println!("check constraints:      {}", flavor.has_check_constraints());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_statements(statements: &[Statement], json: bool) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, statements)?;
        writeln!(stdout)?;
        return Ok(());
    }
    for stmt in statements.iter().filter(|s| !s.is_noop()) {
        let object = stmt
            .object_key()
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        writeln!(
            stdout,
            "{}\t{}\t{}",
            stmt.location(),
            stmt.statement_type,
            object
        )?;
    }
    Ok(())
}
