//! Routing: turn a conversion request into a plan and run it.

use crate::executor::{ExecuteError, ExecutionContext, ExecutionStats, Executor, SimpleExecutor};
use crate::planner::{Plan, Planner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single conversion request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Source file.
    pub input: PathBuf,
    /// Source format tag.
    pub from: String,
    /// Target format tag.
    pub to: String,
    /// Output file, or the configuration document for a sink target.
    pub output: PathBuf,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Request {
    pub fn new(
        input: impl Into<PathBuf>,
        from: impl Into<String>,
        to: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            from: from.into(),
            to: to.into(),
            output: output.into(),
            overwrite: false,
        }
    }

    /// Allow replacing an existing output file.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A completed conversion.
#[derive(Debug)]
pub struct Conversion {
    /// The route that was run.
    pub plan: Plan,
    /// Where the result was written.
    pub output: PathBuf,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

/// Errors for a whole conversion request.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("input file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("config file not found or not readable: {}", .0.display())]
    SinkConfigMissing(PathBuf),

    #[error("output file '{}' already exists (use -f to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no converter found for {from} -> {to}")]
    NoRoute { from: String, to: String },

    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Entry point for conversions: direct edge first, planned route otherwise.
#[derive(Clone)]
pub struct Router {
    ctx: ExecutionContext,
    executor: Arc<dyn Executor>,
}

impl Router {
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            executor: Arc::new(SimpleExecutor::new()),
        }
    }

    /// Use a different executor.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// The route `convert` would take, without running it.
    pub fn plan(&self, from: &str, to: &str) -> Result<Plan, RouteError> {
        let registry = &self.ctx.registry;
        for format in [from, to] {
            if !registry.knows_format(format) {
                return Err(RouteError::UnsupportedFormat(format.to_string()));
            }
        }

        Planner::new(registry)
            .plan_direct_first(from, to)
            .ok_or_else(|| RouteError::NoRoute {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Run a conversion request.
    pub fn convert(&self, request: &Request) -> Result<Conversion, RouteError> {
        self.check_paths(request)?;

        let plan = self.plan(&request.from, &request.to)?;
        let result = self
            .executor
            .execute(&self.ctx, &plan, &request.input, &request.output)?;

        tracing::info!(
            input = %request.input.display(),
            output = %result.output.display(),
            route = %plan,
            "converted"
        );

        Ok(Conversion {
            plan,
            output: result.output,
            stats: result.stats,
        })
    }

    fn check_paths(&self, request: &Request) -> Result<(), RouteError> {
        if !request.input.exists() {
            return Err(RouteError::SourceNotFound(request.input.clone()));
        }

        if self.ctx.registry.is_sink(&request.to) {
            if !is_readable_file(&request.output) {
                return Err(RouteError::SinkConfigMissing(request.output.clone()));
            }
        } else if !request.overwrite && request.output.exists() {
            return Err(RouteError::OutputExists(request.output.clone()));
        }

        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("ctx", &self.ctx).finish()
    }
}

fn is_readable_file(path: &Path) -> bool {
    std::fs::File::open(path).is_ok() && path.is_file()
}
