// crates/rulecfn-cli/src/main.rs
// ============================================================================
// Module: Rulecfn CLI Entry Point
// Description: Command dispatcher for compiling rule definitions.
// Purpose: Compile, check, and inspect templates from rule definition files.
// Dependencies: clap, rulecfn-config, rulecfn-core, serde_jcs, tracing
// ============================================================================

//! ## Overview
//! The `rulecfn` binary loads `rulecfn.toml`, reads rule definition files,
//! and drives the namespacing, build, and compile pipeline. Templates and
//! other artifacts go to stdout or a file as pretty JSON with canonical key
//! order. Diagnostics and logs go to stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;
mod rule_files;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rule_files::FileRuleSource;
use rule_files::RuleFile;
use rule_files::read_bytes_with_limit;
use rule_files::read_rule_file;
use rulecfn_config::RulecfnConfig;
use rulecfn_config::config_toml_example;
use rulecfn_core::DeploymentRevision;
use rulecfn_core::FragmentKind;
use rulecfn_core::Pipeline;
use rulecfn_core::RuleDefinition;
use rulecfn_core::TemplateCompiler;
use rulecfn_core::TemplateDocument;
use rulecfn_core::build_fragment;
use rulecfn_core::handler_manifest;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a template JSON input.
const MAX_TEMPLATE_BYTES: usize = 4 * 1024 * 1024;
/// Environment variable holding the log filter.
const LOG_ENV: &str = "RULECFN_LOG";
/// Log filter used when `RULECFN_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Log filter used with `--verbose`.
const VERBOSE_LOG_FILTER: &str = "debug";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "rulecfn", version, disable_help_subcommand = true)]
struct Cli {
    /// Emit debug logs to stderr (overrides `RULECFN_LOG`).
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile rule definitions into a template.
    Compile(CompileCommand),
    /// Fail when an on-disk template differs from a fresh compile.
    Check(CheckCommand),
    /// Print the handler manifest of a compiled template.
    Handlers(HandlersCommand),
    /// Print one fragment for a rule definition.
    Fragment(FragmentCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Inputs shared by commands that run the compile pipeline.
#[derive(Args, Debug)]
struct CompileInputArgs {
    /// Optional config file path (defaults to rulecfn.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rule definition files (replaces `rules.paths` from config).
    #[arg(long = "rules", value_name = "PATH", num_args = 1..)]
    rules: Vec<PathBuf>,
    /// Optional base template to fold rules into.
    #[arg(long, value_name = "PATH")]
    base: Option<PathBuf>,
    /// Deployment revision token (overrides `deployment.revision`).
    #[arg(long, value_name = "TOKEN")]
    revision_token: Option<String>,
}

/// Arguments for `compile`.
#[derive(Args, Debug)]
struct CompileCommand {
    /// Pipeline inputs.
    #[command(flatten)]
    inputs: CompileInputArgs,
    /// Output path (overrides `output.path`; stdout when neither is set).
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Pipeline inputs.
    #[command(flatten)]
    inputs: CompileInputArgs,
    /// Template to compare against.
    #[arg(long, value_name = "PATH")]
    template: PathBuf,
}

/// Arguments for `handlers`.
#[derive(Args, Debug)]
struct HandlersCommand {
    /// Compiled template to scan.
    #[arg(long, value_name = "PATH")]
    template: PathBuf,
}

/// Arguments for `fragment`.
#[derive(Args, Debug)]
struct FragmentCommand {
    /// Optional config file path (defaults to rulecfn.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rule definition file holding exactly one rule.
    #[arg(long, value_name = "PATH")]
    rule: PathBuf,
    /// Fragment kind (for example `compute`, `eventRule`, `gatewayMethod`).
    #[arg(long, value_name = "KIND")]
    kind: String,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
    /// Print an example config file.
    Example,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to rulecfn.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(command: Commands) -> CliResult<ExitCode> {
    match command {
        Commands::Compile(command) => command_compile(&command),
        Commands::Check(command) => command_check(&command),
        Commands::Handlers(command) => command_handlers(&command),
        Commands::Fragment(command) => command_fragment(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// SECTION: Compile Commands
// ============================================================================

/// Executes the `compile` command.
fn command_compile(command: &CompileCommand) -> CliResult<ExitCode> {
    let config = load_config(command.inputs.config.as_deref())?;
    let document = compile_inputs(&config, &command.inputs)?;
    let rendered = render_json(&document)?;
    match command.out.clone().or_else(|| config.output_path()) {
        Some(path) => {
            write_file(&path, rendered.as_bytes())?;
            info!(path = %path.display(), "template written");
        }
        None => write_stdout(rendered.as_bytes())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check` command.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.inputs.config.as_deref())?;
    let document = compile_inputs(&config, &command.inputs)?;
    let expected = serde_json::to_value(&document)
        .map_err(|err| CliError::new(format!("failed to render template: {err}")))?;
    let on_disk = read_json_value(&command.template, "template")?;
    if on_disk != expected {
        return Err(CliError::new(format!(
            "template {} is out of date",
            command.template.display()
        )));
    }
    write_stdout(format!("template {} is up to date\n", command.template.display()).as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the pipeline over the configured or overridden inputs.
fn compile_inputs(
    config: &RulecfnConfig,
    inputs: &CompileInputArgs,
) -> CliResult<TemplateDocument> {
    let source = FileRuleSource::new(rule_files(config, &inputs.rules));
    if source.files().is_empty() {
        warn!("no rule definition files given; compiling shared resources only");
    }
    debug!(files = source.files().len(), "compiling rule definition files");

    let base = match &inputs.base {
        Some(path) => read_template(path)?,
        None => TemplateDocument::default(),
    };
    pipeline(config, inputs.revision_token.as_deref())
        .run(&source, &base)
        .map_err(|err| CliError::new(format!("compile failed: {err}")))
}

/// Returns `--rules` as given, else `rules.paths` as authored in config.
fn rule_files(config: &RulecfnConfig, overrides: &[PathBuf]) -> Vec<RuleFile> {
    if overrides.is_empty() {
        config
            .rule_files()
            .into_iter()
            .map(|(module_path, path)| RuleFile::new(module_path, path))
            .collect()
    } else {
        overrides.iter().map(|path| RuleFile::as_given(path)).collect()
    }
}

/// Builds the pipeline from config plus CLI overrides.
fn pipeline(config: &RulecfnConfig, revision_token: Option<&str>) -> Pipeline {
    let mut options = config.compile_options();
    if let Some(token) = revision_token {
        options.revision = DeploymentRevision::Token(token.to_string());
    }
    Pipeline::new(config.namer(), config.rule_builder(), TemplateCompiler::new(options))
}

// ============================================================================
// SECTION: Inspection Commands
// ============================================================================

/// Executes the `handlers` command.
fn command_handlers(command: &HandlersCommand) -> CliResult<ExitCode> {
    let document = read_template(&command.template)?;
    let manifest = handler_manifest(&document);
    write_stdout(render_json(&manifest)?.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `fragment` command.
fn command_fragment(command: &FragmentCommand) -> CliResult<ExitCode> {
    let kind =
        FragmentKind::from_str(&command.kind).map_err(|err| CliError::new(err.to_string()))?;
    let config = load_config(command.config.as_deref())?;
    let definitions =
        read_rule_file(&RuleFile::as_given(&command.rule))
            .map_err(|err| CliError::new(err.to_string()))?;
    let definition = single_definition(definitions)?;
    let pipeline = pipeline(&config, None);
    let rule = pipeline.prepare(&definition);
    let fragment = build_fragment(&rule, kind, config.build.runtime.as_str())
        .map_err(|err| CliError::new(format!("fragment {kind} failed: {err}")))?;
    write_stdout(render_json(&fragment)?.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Returns the only definition in `definitions`.
fn single_definition(definitions: Vec<RuleDefinition>) -> CliResult<RuleDefinition> {
    let count = definitions.len();
    let mut iter = definitions.into_iter();
    match (iter.next(), count) {
        (Some(definition), 1) => Ok(definition),
        _ => Err(CliError::new(format!(
            "fragment requires exactly one rule definition, found {count}"
        ))),
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => {
            RulecfnConfig::load(command.config.as_deref())
                .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
            write_stdout(b"config ok\n")?;
        }
        ConfigCommand::Example => write_stdout(config_toml_example().as_bytes())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads config, falling back to defaults when no config file exists.
fn load_config(path: Option<&Path>) -> CliResult<RulecfnConfig> {
    RulecfnConfig::load_or_default(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a JSON file with the template size limit.
fn read_json_value(path: &Path, kind: &str) -> CliResult<Value> {
    let bytes = read_bytes_with_limit(path, MAX_TEMPLATE_BYTES).map_err(|err| {
        CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid {kind} json {}: {err}", path.display())))
}

/// Reads a template document.
fn read_template(path: &Path) -> CliResult<TemplateDocument> {
    let value = read_json_value(path, "template")?;
    serde_json::from_value(value)
        .map_err(|err| CliError::new(format!("invalid template {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Renders `value` as pretty JSON in canonical key order with a trailing newline.
fn render_json<T: Serialize>(value: &T) -> CliResult<String> {
    let canonical = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to canonicalize json: {err}")))?;
    let normalized: Value = serde_json::from_slice(&canonical)
        .map_err(|err| CliError::new(format!("failed to canonicalize json: {err}")))?;
    let mut rendered = serde_json::to_string_pretty(&normalized)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Writes `bytes` to `path`, creating parent directories.
fn write_file(path: &Path, bytes: &[u8]) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            CliError::new(format!("failed to create {}: {err}", parent.display()))
        })?;
    }
    fs::write(path, bytes)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))
}

/// Writes raw bytes to stdout.
fn write_stdout(bytes: &[u8]) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(bytes)
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
