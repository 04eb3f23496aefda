//! primdb Command-Line Interface
//!
//! A small file-backed table store driven by a SQL-like command language.
//!
//! # Usage
//!
//! ```bash
//! # Start interactive REPL on ./data
//! primdb
//!
//! # Execute a single command
//! primdb -c "select from users"
//!
//! # Execute commands from a file, one per line
//! primdb -f setup.primdb
//!
//! # Output as JSON
//! primdb -o json -c "select from users where active = true"
//!
//! # Write the effective settings to a config file
//! primdb -d /srv/primdb -o csv --save-config ~/.primdb/config.toml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use primdb_sql::storage::Persistence;
use primdb_sql::Session;

mod config;
mod formatter;
mod repl;

use config::CliConfig;
use formatter::OutputFormat;
use repl::{Flow, Repl, Runner};

/// primdb command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "primdb",
    version,
    about = "Command-line interface for primdb",
    long_about = "A small single-user table store with a SQL-like command language.\n\n\
                  Tables live as JSON files under the data directory. Type `help`\n\
                  in the shell for the list of commands."
)]
struct Args {
    /// Data directory
    #[arg(short = 'd', long, value_name = "DIR", env = "PRIMDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, conflicts_with = "data_dir")]
    memory: bool,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Execute commands from file (one per line) and exit
    #[arg(short = 'f', long, value_name = "FILE", conflicts_with = "command")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,

    /// Do not ask before delete and drop_table
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print the time each command took
    #[arg(long)]
    timing: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress banner (for scripting)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE", env = "PRIMDB_CONFIG")]
    config: Option<PathBuf>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE", conflicts_with_all = ["command", "file"])]
    save_config: Option<PathBuf>,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);

    // Load configuration
    let config = load_config(&args)?;

    if let Some(path) = &args.save_config {
        return save_config(&config, path);
    }

    if config.in_memory {
        let session = Session::in_memory();
        dispatch(&args, &config, session)
    } else {
        let session = Session::open_dir(&config.database).with_context(|| {
            format!(
                "cannot open database in {}",
                config.database.data_dir.display()
            )
        })?;
        info!(data_dir = %config.database.data_dir.display(), "database opened");
        dispatch(&args, &config, session)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "primdb_cli=debug,primdb_sql=debug,primdb_cache=debug"
    } else {
        "primdb_cli=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    // Try to load from config file
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };

    // Override with command line arguments
    if let Some(dir) = &args.data_dir {
        config.database.data_dir = dir.clone();
    }
    if let Some(output) = args.output {
        config.output_format = output.into();
    }
    config.in_memory = args.memory;
    config.timing |= args.timing;
    if args.yes {
        config.confirm_destructive = false;
    }

    Ok(config)
}

fn save_config(config: &CliConfig, path: &Path) -> Result<()> {
    config.save(path)?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn dispatch<P: Persistence>(args: &Args, config: &CliConfig, session: Session<P>) -> Result<()> {
    let format = config.output_format;

    if let Some(command) = &args.command {
        // Execute single command
        info!("Executing command: {}", command);
        Runner::new(session, format, config.timing).execute_and_print(command);
        Ok(())
    } else if let Some(file) = &args.file {
        // Execute from file
        execute_file(&mut Runner::new(session, format, config.timing), file)
    } else {
        // Start interactive REPL
        let mut repl = Repl::new(session, config, format)?;
        if !args.quiet {
            repl.print_banner();
        }
        repl.run()
    }
}

fn execute_file<P: Persistence>(runner: &mut Runner<P>, path: &Path) -> Result<()> {
    info!("Executing file: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    for line in script_lines(&content) {
        if runner.execute_and_print(line) == Flow::Exit {
            break;
        }
    }

    Ok(())
}

/// Returns the command lines of a script, skipping blanks and comments.
fn script_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use primdb_sql::storage::MemoryStore;
    use tempfile::TempDir;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "output_format = \"csv\"\n[database]\ndata_dir = \"/from/file\"\n")
            .unwrap();
        let path_arg = path.to_string_lossy().to_string();
        let path_arg = path_arg.as_str();

        let args = Args::parse_from(["primdb", "--config", path_arg, "-o", "json", "-y"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.database.data_dir, PathBuf::from("/from/file"));
        assert!(!config.confirm_destructive);

        let args = Args::parse_from(["primdb", "--config", path_arg, "-d", "/from/flag"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.database.data_dir, PathBuf::from("/from/flag"));
        assert!(config.confirm_destructive);
    }

    #[test]
    fn test_save_config_writes_effective_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");
        let path_arg = path.to_string_lossy().to_string();

        let args = Args::parse_from([
            "primdb",
            "-d",
            "/srv/primdb",
            "-o",
            "csv",
            "--timing",
            "--save-config",
            path_arg.as_str(),
        ]);
        let config = load_config(&args).unwrap();
        save_config(&config, args.save_config.as_deref().unwrap()).unwrap();

        let args = Args::parse_from(["primdb", "--config", path_arg.as_str()]);
        let loaded = load_config(&args).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.database.data_dir, PathBuf::from("/srv/primdb"));
        assert_eq!(loaded.output_format, OutputFormat::Csv);
        assert!(loaded.timing);
    }

    #[test]
    fn test_script_lines() {
        let script = "# setup\ncreate_table t n:int\n\n  -- seed\ninsert into t values (1)\n";
        let lines: Vec<&str> = script_lines(script).collect();
        assert_eq!(lines, vec!["create_table t n:int", "insert into t values (1)"]);
    }

    #[test]
    fn test_execute_file_stops_at_exit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("script.primdb");
        std::fs::write(
            &path,
            "create_table t n:int\ninsert into t values (1)\nexit\ninsert into t values (2)\n",
        )
        .unwrap();

        let mut runner: Runner<MemoryStore> =
            Runner::new(Session::in_memory(), OutputFormat::Raw, false);
        execute_file(&mut runner, &path).unwrap();

        let rows = runner.session().store().load_rows("t").unwrap();
        assert_eq!(rows.len(), 1);
    }
}
