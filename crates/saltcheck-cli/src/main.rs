// crates/saltcheck-cli/src/main.rs
// ============================================================================
// Module: Saltcheck CLI Entry Point
// Description: Command dispatcher for state, highstate, and ad-hoc test runs.
// Purpose: Wire configuration and local providers into a saltcheck session.
// Dependencies: clap, saltcheck-core, saltcheck-config, saltcheck-providers, serde, thiserror
// ============================================================================

//! ## Overview
//! The `saltcheck` binary loads `saltcheck.toml`, builds the local providers
//! over the configured file roots, and runs tests through a
//! [`Saltcheck`] session. Reports are written to stdout as pretty JSON; the
//! exit status follows the report's return code. Errors go to stderr and
//! exit with status 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use saltcheck_config::SaltcheckConfig;
use saltcheck_core::AuditSink;
use saltcheck_core::Collaborators;
use saltcheck_core::ResultRecord;
use saltcheck_core::RunReport;
use saltcheck_core::Saltcheck;
use saltcheck_providers::FileRootCache;
use saltcheck_providers::ModuleRegistry;
use saltcheck_providers::SlsStateCatalog;
use saltcheck_providers::YamlTestRenderer;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an ad-hoc test definition.
const MAX_TEST_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "saltcheck", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Optional config file path (defaults to saltcheck.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tests for a comma-separated list of states.
    RunStateTests(RunStateTestsCommand),
    /// Run the tests for every state assigned in the top file.
    RunHighstateTests(RunHighstateTestsCommand),
    /// Run a single ad-hoc test definition.
    RunTest(RunTestCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `run-state-tests`.
#[derive(Args, Debug)]
struct RunStateTestsCommand {
    /// Comma-separated state names.
    #[arg(value_name = "STATES")]
    states: String,
    /// Environment to resolve states and tests in.
    #[arg(long, value_name = "ENV")]
    saltenv: Option<String>,
    /// Run every test file in the discovered directories.
    #[arg(long, action = ArgAction::SetTrue)]
    check_all: bool,
}

/// Arguments for `run-highstate-tests`.
#[derive(Args, Debug)]
struct RunHighstateTestsCommand {
    /// Environment whose top file is read.
    #[arg(long, value_name = "ENV")]
    saltenv: Option<String>,
}

/// Arguments for `run-test`.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct RunTestCommand {
    /// Test definition as an inline JSON object.
    #[arg(long, value_name = "JSON")]
    test: Option<String>,
    /// Path to a file holding the JSON test definition.
    #[arg(long, value_name = "PATH")]
    test_file: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a saltcheck configuration file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the message printed to stderr.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Bounded file read failures.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("saltcheck {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = cli.config.as_deref();
    match command {
        Commands::RunStateTests(command) => command_run_state_tests(config, &command),
        Commands::RunHighstateTests(command) => command_run_highstate_tests(config, &command),
        Commands::RunTest(command) => command_run_test(config, &command),
        Commands::Config {
            command,
        } => command_config(config, &command),
    }
}

/// Prints CLI help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Configuration and local providers backing a session.
struct Runtime {
    /// Loaded configuration.
    config: SaltcheckConfig,
    /// Execution module registry.
    registry: ModuleRegistry,
    /// File-root test directory cache.
    cache: FileRootCache,
    /// File-root state catalog.
    states: SlsStateCatalog,
    /// YAML test file renderer.
    renderer: YamlTestRenderer,
    /// Configured audit sink.
    audit: Box<dyn AuditSink>,
}

impl Runtime {
    /// Loads configuration and builds the providers.
    ///
    /// `saltenv` selects the environment used by the state apply alias; the
    /// configured default applies when it is absent.
    fn load(config_path: Option<&Path>, saltenv: Option<&str>) -> CliResult<Self> {
        let config = load_config(config_path)?;
        let saltenv = saltenv.unwrap_or(&config.tests.saltenv).to_string();
        let states = SlsStateCatalog::new(config.file_roots.clone());
        let registry = ModuleRegistry::with_builtin_modules(states.clone(), saltenv)
            .map_err(|err| CliError::new(format!("module registry setup failed: {err}")))?;
        let audit = config
            .audit_sink()
            .map_err(|err| CliError::new(format!("audit sink setup failed: {err}")))?;
        Ok(Self {
            cache: FileRootCache::new(config.file_roots.clone()),
            states,
            registry,
            renderer: YamlTestRenderer::default(),
            audit,
            config,
        })
    }

    /// Returns a session over the providers.
    fn session(&self) -> Saltcheck<'_> {
        Saltcheck::new(Collaborators {
            invoker: &self.registry,
            modules: &self.registry,
            states: &self.states,
            cache: &self.cache,
            renderer: &self.renderer,
            config: &self.config,
            audit: self.audit.as_ref(),
        })
    }
}

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<SaltcheckConfig> {
    SaltcheckConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

// ============================================================================
// SECTION: Run Commands
// ============================================================================

/// Executes `run-state-tests`.
fn command_run_state_tests(
    config: Option<&Path>,
    command: &RunStateTestsCommand,
) -> CliResult<ExitCode> {
    let runtime = Runtime::load(config, command.saltenv.as_deref())?;
    let report = runtime
        .session()
        .run_state_tests(&command.states, command.saltenv.as_deref(), command.check_all)
        .map_err(|err| CliError::new(format!("state test run failed: {err}")))?;
    write_report(&report)
}

/// Executes `run-highstate-tests`.
fn command_run_highstate_tests(
    config: Option<&Path>,
    command: &RunHighstateTestsCommand,
) -> CliResult<ExitCode> {
    let runtime = Runtime::load(config, command.saltenv.as_deref())?;
    let report = runtime
        .session()
        .run_highstate_tests(command.saltenv.as_deref())
        .map_err(|err| CliError::new(format!("highstate test run failed: {err}")))?;
    write_report(&report)
}

/// Executes `run-test`.
fn command_run_test(config: Option<&Path>, command: &RunTestCommand) -> CliResult<ExitCode> {
    let test = read_test_definition(command)?;
    let runtime = Runtime::load(config, None)?;
    let record = runtime
        .session()
        .run_test(&test)
        .map_err(|err| CliError::new(format!("test run failed: {err}")))?;
    write_record(&record)
}

/// Parses the ad-hoc test definition from the inline flag or a file.
fn read_test_definition(command: &RunTestCommand) -> CliResult<Value> {
    let bytes = match (&command.test, &command.test_file) {
        (Some(inline), _) => inline.as_bytes().to_vec(),
        (None, Some(path)) => {
            read_bytes_with_limit(path, MAX_TEST_BYTES).map_err(|err| match err {
                ReadLimitError::Io(err) => CliError::new(format!(
                    "unable to read test file {}: {err}",
                    path.display()
                )),
                ReadLimitError::TooLarge {
                    size,
                    limit,
                } => CliError::new(format!(
                    "test file {} is too large ({size} > {limit} bytes)",
                    path.display()
                )),
            })?
        }
        (None, None) => {
            return Err(CliError::new("run-test requires --test or --test-file".to_string()));
        }
    };
    parse_test_definition(&bytes)
}

/// Parses test definition bytes as JSON.
fn parse_test_definition(bytes: &[u8]) -> CliResult<Value> {
    if bytes.len() > MAX_TEST_BYTES {
        return Err(CliError::new(format!(
            "test definition is too large ({} > {MAX_TEST_BYTES} bytes)",
            bytes.len()
        )));
    }
    serde_json::from_slice(bytes)
        .map_err(|err| CliError::new(format!("test definition is not valid json: {err}")))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(config),
    }
}

/// Executes the config validation command.
fn command_config_validate(config: Option<&Path>) -> CliResult<ExitCode> {
    let _config = load_config(config)?;
    write_stdout_line("config is valid")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a run report and maps its return code to an exit code.
fn write_report(report: &RunReport) -> CliResult<ExitCode> {
    write_pretty_json(report)?;
    Ok(exit_code_for(report.retcode()))
}

/// Writes a single result record; failing tests exit with status 1.
fn write_record(record: &ResultRecord) -> CliResult<ExitCode> {
    write_pretty_json(record)?;
    Ok(exit_code_for(i32::from(record.status.is_fail())))
}

/// Maps a report return code onto a process exit code.
fn exit_code_for(retcode: i32) -> ExitCode {
    if retcode == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Serializes a value as pretty JSON to stdout.
fn write_pretty_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("unable to serialize output: {err}")))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
