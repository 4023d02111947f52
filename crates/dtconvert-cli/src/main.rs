//! dtconvert CLI - route files between document and data formats

mod config;
mod errors;
mod formats;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use config::Config;
use dtconvert_core::{
    ExecutableResolver, ExecuteError, ExecutionContext, ExternalConverter, Registry, Request,
    RouteError, Router,
};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Process exit status for a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    InvalidArgs = 1,
    FileNotFound = 2,
    UnsupportedFormat = 3,
    ConversionFailed = 4,
    NoConverter = 5,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status as u8)
    }
}

/// A user-facing error carrying its exit status.
#[derive(Debug)]
struct Failure {
    status: Status,
    message: String,
}

impl Failure {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// Translate a routing error into a message with suggestions.
fn route_failure(err: RouteError, registry: &Registry, target: &str) -> Failure {
    match &err {
        RouteError::SourceNotFound(path) => {
            Failure::new(Status::FileNotFound, errors::file_not_found_error(path))
        }
        RouteError::SinkConfigMissing(path) => Failure::new(
            Status::FileNotFound,
            errors::sink_config_error(path, target),
        ),
        RouteError::OutputExists(_) => Failure::new(Status::InvalidArgs, err.to_string()),
        RouteError::UnsupportedFormat(format) => Failure::new(
            Status::UnsupportedFormat,
            errors::unsupported_format_error(format, registry),
        ),
        RouteError::NoRoute { from, to } => Failure::new(
            Status::NoConverter,
            errors::no_path_error(from, to, registry),
        ),
        RouteError::Execute(ExecuteError::ConverterNotFound(_)) => {
            Failure::new(Status::NoConverter, err.to_string())
        }
        RouteError::Execute(e) => {
            Failure::new(Status::ConversionFailed, format!("Conversion failed: {e}"))
        }
    }
}

/// Output verbosity level.
#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn info(self, msg: &str) {
        if !matches!(self, Verbosity::Quiet) {
            println!("{msg}");
        }
    }

    fn debug(self, msg: &str) {
        if matches!(self, Verbosity::Verbose) {
            println!("[debug] {msg}");
        }
    }

    fn result(self, msg: &str) {
        if !matches!(self, Verbosity::Quiet) {
            println!("{msg}");
        }
    }
}

#[derive(Parser)]
#[command(name = "dtconvert")]
#[command(about = "Convert documents and tabular data between formats", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file (default: ~/.config/dtconvert/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file
    Convert {
        /// Input file
        input: PathBuf,
        /// Target format
        #[arg(short, long)]
        to: String,
        /// Source format (default: from the input extension)
        #[arg(long)]
        from: Option<String>,
        /// Output file, or the connection config for a storage target
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },

    /// Plan a conversion (show steps without executing)
    Plan {
        /// Source format
        from: String,
        /// Target format
        to: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available converters
    List,

    /// List known formats
    Formats,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page
    Manpage,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                Status::InvalidArgs.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            e.downcast_ref::<Failure>()
                .map_or(Status::ConversionFailed, |f| f.status)
                .into()
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = if let Some(ref path) = cli.config {
        Config::load_from_path(Some(path.clone()))
    } else {
        Config::load()
    };

    // Config defaults, CLI flags override
    let verbose = cli.verbose || config.defaults.verbose;
    let quiet = cli.quiet || config.defaults.quiet;
    let verbosity = Verbosity::from_flags(verbose, quiet);
    init_tracing(verbose);

    let registry = Arc::new(build_registry(&config));
    let router = Router::new(ExecutionContext::new(registry.clone()));

    match cli.command {
        Commands::Convert {
            input,
            to,
            from,
            output,
            force,
        } => cmd_convert(
            &router,
            input,
            from,
            &to,
            output,
            force || config.defaults.force,
            verbosity,
        ),
        Commands::Plan { from, to, json } => cmd_plan(&router, &from, &to, json, verbosity),
        Commands::List => cmd_list(&registry, verbosity),
        Commands::Formats => cmd_formats(&registry, verbosity),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "dtconvert", &mut std::io::stdout());
            Ok(())
        }
        Commands::Manpage => {
            let man = clap_mangen::Man::new(Cli::command());
            man.render(&mut std::io::stdout())
                .context("Failed to render man page")?;
            Ok(())
        }
    }
}

/// Log to stderr, honouring `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,dtconvert_core=debug,dtconvert_data=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The standard converters plus any configured external ones.
fn build_registry(config: &Config) -> Registry {
    let resolver = Arc::new(
        ExecutableResolver::from_env().with_leading_roots(config.search_paths.iter().cloned()),
    );

    let mut registry = Registry::new();
    let externals = config.builtin_externals.then(|| resolver.clone());
    dtconvert_data::register_defaults(&mut registry, &config.data_options(), externals);

    for entry in &config.converters {
        let from = formats::canonical(&entry.from);
        let to = formats::canonical(&entry.to);
        let mut converter =
            ExternalConverter::new(&from, &to, entry.path.clone(), resolver.clone());
        if let Some(ref description) = entry.description {
            converter = converter.description(description.clone());
        }
        if entry.sink {
            converter = converter.sink();
        }
        registry.register(converter);
    }

    registry
}

fn cmd_convert(
    router: &Router,
    input: PathBuf,
    from: Option<String>,
    to: &str,
    output: Option<PathBuf>,
    force: bool,
    v: Verbosity,
) -> Result<()> {
    let registry = &router.context().registry;
    let to = formats::canonical(to);

    let from = match from {
        Some(from) => formats::canonical(&from),
        None => formats::detect(&input).ok_or_else(|| {
            Failure::new(
                Status::InvalidArgs,
                errors::format_detection_error(&input, registry),
            )
        })?,
    };

    let output = match output {
        Some(output) => output,
        None if registry.is_sink(&to) => {
            return Err(Failure::new(
                Status::InvalidArgs,
                format!("'{}' target requires -o <config.json>", to),
            )
            .into());
        }
        None => formats::default_output(&input, &to),
    };

    v.debug(&format!(
        "Converting: {} -> {}",
        input.display(),
        output.display()
    ));
    v.debug(&format!("Input format: {}", from));
    v.debug(&format!("Output format: {}", to));

    let request = Request::new(&input, &from, &to, &output).overwrite(force);
    let conversion = router
        .convert(&request)
        .map_err(|e| route_failure(e, registry, &to))?;

    v.debug(&format!("Route: {}", conversion.plan));
    v.debug(&format!(
        "{} step(s), {} temporary file(s), {:.2?}",
        conversion.stats.steps_executed, conversion.stats.temporaries, conversion.stats.duration
    ));
    v.result(&format!(
        "Converted {} -> {}",
        input.display(),
        conversion.output.display()
    ));
    Ok(())
}

fn cmd_plan(router: &Router, from: &str, to: &str, json: bool, v: Verbosity) -> Result<()> {
    let registry = &router.context().registry;
    let from = formats::canonical(from);
    let to = formats::canonical(to);

    let plan = router
        .plan(&from, &to)
        .map_err(|e| route_failure(e, registry, &to))?;

    if json {
        let rendered = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{rendered}");
        return Ok(());
    }

    v.info(&format!("Planning: {} -> {}", from, to));
    v.info("");
    v.info("Steps:");
    for (i, step) in plan.steps.iter().enumerate() {
        v.result(&format!(
            "  {}. {} ({} -> {})",
            i + 1,
            step.converter_id,
            step.from,
            step.to
        ));
    }

    if registry.is_sink(&to) {
        v.info("");
        v.info(&format!(
            "Note: '{}' is a storage target; -o names its connection config.",
            to
        ));
    }

    Ok(())
}

fn cmd_list(registry: &Registry, v: Verbosity) -> Result<()> {
    v.info("Available converters:\n");

    for decl in registry.declarations() {
        v.info(&format!("  {}", decl.id));
        if !decl.description.is_empty() {
            v.info(&format!("    {}", decl.description));
        }
        let marker = if decl.sink { " [sink]" } else { "" };
        v.info(&format!("    {} -> {}{}", decl.from, decl.to, marker));
        v.info(&format!("    via: {}", decl.reference));
        v.info("");
    }

    v.info(&format!("Total: {} converters", registry.len()));
    Ok(())
}

fn cmd_formats(registry: &Registry, v: Verbosity) -> Result<()> {
    v.info("Known formats:\n");

    let known = registry.formats();
    for format in &known {
        let marker = if registry.is_sink(format) { " [sink]" } else { "" };
        v.info(&format!(
            "  {:<12} {}{}",
            format,
            formats::description(format),
            marker
        ));
    }

    v.info("");
    v.info(&format!("Total: {} formats", known.len()));
    Ok(())
}
