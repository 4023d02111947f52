//! Executor: runs a conversion plan as a pipeline of converter invocations.
//!
//! The Executor trait separates WHAT to convert (Planner) from HOW it is
//! run. Each hop except the last writes to a temporary file that becomes
//! the next hop's input; the last hop writes to the requested output.

use crate::converter::ConvertError;
use crate::planner::{Plan, PlanStep};
use crate::registry::Registry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempPath;

/// Context for executing conversion plans.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// Registry of available converters.
    pub registry: Arc<Registry>,
    /// Directory for intermediate files (system temp dir when `None`).
    pub temp_dir: Option<PathBuf>,
}

impl ExecutionContext {
    /// Create a new execution context with the given registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            temp_dir: None,
        }
    }

    /// Place intermediate files in `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Result of executing a conversion plan.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Path the final hop wrote to.
    pub output: PathBuf,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

/// Statistics from plan execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// Total execution duration.
    pub duration: Duration,
    /// Number of converter steps executed.
    pub steps_executed: usize,
    /// Number of intermediate files created (all removed by the time the
    /// result is returned).
    pub temporaries: usize,
}

/// Errors that can occur during plan execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("empty plan")]
    EmptyPlan,

    #[error("converter not found: {0}")]
    ConverterNotFound(String),

    #[error("step {step} ({converter_id}) targets sink format '{format}' but is not the last step")]
    SinkNotFinal {
        step: usize,
        converter_id: String,
        format: String,
    },

    #[error("failed to create temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("conversion failed at step {step} ({converter_id}): {source}")]
    StepFailed {
        step: usize,
        converter_id: String,
        #[source]
        source: ConvertError,
    },
}

/// Executor determines HOW a plan runs.
pub trait Executor: Send + Sync {
    /// Run `plan`, reading `input` and leaving the result at `output`.
    fn execute(
        &self,
        ctx: &ExecutionContext,
        plan: &Plan,
        input: &Path,
        output: &Path,
    ) -> Result<ExecutionResult, ExecuteError>;
}

/// Sequential executor: one hop at a time, each to completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleExecutor;

impl SimpleExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Check every step before anything runs or any file is allocated.
    fn validate(&self, ctx: &ExecutionContext, plan: &Plan) -> Result<(), ExecuteError> {
        let last = plan.steps.len() - 1;
        for (idx, step) in plan.steps.iter().enumerate() {
            if ctx.registry.get(&step.converter_id).is_none() {
                return Err(ExecuteError::ConverterNotFound(step.converter_id.clone()));
            }
            if idx != last && ctx.registry.is_sink(&step.to) {
                return Err(ExecuteError::SinkNotFinal {
                    step: idx,
                    converter_id: step.converter_id.clone(),
                    format: step.to.clone(),
                });
            }
        }
        Ok(())
    }

    fn temporary(&self, ctx: &ExecutionContext, step: &PlanStep) -> Result<TempPath, ExecuteError> {
        let suffix = format!(".{}", step.to);
        let mut builder = tempfile::Builder::new();
        builder.prefix("dtconvert").suffix(&suffix);
        let file = match &ctx.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ExecuteError::TempFile)?;
        Ok(file.into_temp_path())
    }

    fn run_steps(
        &self,
        ctx: &ExecutionContext,
        plan: &Plan,
        input: &Path,
        output: &Path,
        temporaries: &mut Vec<TempPath>,
        stats: &mut ExecutionStats,
    ) -> Result<(), ExecuteError> {
        let last = plan.steps.len() - 1;
        let mut current = input.to_path_buf();

        for (idx, step) in plan.steps.iter().enumerate() {
            let converter = ctx
                .registry
                .get(&step.converter_id)
                .ok_or_else(|| ExecuteError::ConverterNotFound(step.converter_id.clone()))?;

            let target = if idx == last {
                output.to_path_buf()
            } else {
                let temp = self.temporary(ctx, step)?;
                let path = temp.to_path_buf();
                temporaries.push(temp);
                stats.temporaries += 1;
                path
            };

            tracing::debug!(
                step = idx,
                converter = %step.converter_id,
                input = %current.display(),
                output = %target.display(),
                "running step"
            );

            converter
                .run(&current, &target)
                .map_err(|source| ExecuteError::StepFailed {
                    step: idx,
                    converter_id: step.converter_id.clone(),
                    source,
                })?;

            stats.steps_executed += 1;
            current = target;
        }

        Ok(())
    }
}

impl Executor for SimpleExecutor {
    fn execute(
        &self,
        ctx: &ExecutionContext,
        plan: &Plan,
        input: &Path,
        output: &Path,
    ) -> Result<ExecutionResult, ExecuteError> {
        if plan.steps.is_empty() {
            return Err(ExecuteError::EmptyPlan);
        }
        self.validate(ctx, plan)?;

        let start = Instant::now();
        let mut stats = ExecutionStats::default();
        let mut temporaries = Vec::new();

        let result = self.run_steps(ctx, plan, input, output, &mut temporaries, &mut stats);

        for temp in temporaries {
            let path = temp.to_path_buf();
            if let Err(e) = temp.close() {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary file");
            }
        }

        result?;
        stats.duration = start.elapsed();
        tracing::debug!(
            steps = stats.steps_executed,
            temporaries = stats.temporaries,
            duration_ms = stats.duration.as_millis() as u64,
            "pipeline finished"
        );

        Ok(ExecutionResult {
            output: output.to_path_buf(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{Converter, ConverterDecl};
    use std::fs;

    /// Appends `|<to>` to whatever it reads.
    struct Append {
        decl: ConverterDecl,
    }

    impl Converter for Append {
        fn decl(&self) -> &ConverterDecl {
            &self.decl
        }

        fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
            let data = fs::read_to_string(input).map_err(|e| ConvertError::io(input, e))?;
            fs::write(output, format!("{data}|{}", self.decl.to))
                .map_err(|e| ConvertError::io(output, e))
        }
    }

    struct Fail {
        decl: ConverterDecl,
    }

    impl Converter for Fail {
        fn decl(&self) -> &ConverterDecl {
            &self.decl
        }

        fn run(&self, _input: &Path, _output: &Path) -> Result<(), ConvertError> {
            Err(ConvertError::ExitStatus {
                program: "fail".into(),
                code: Some(3),
            })
        }
    }

    fn append(from: &str, to: &str) -> Append {
        Append {
            decl: ConverterDecl::new(format!("{from}-to-{to}"), from, to),
        }
    }

    fn step(from: &str, to: &str) -> PlanStep {
        PlanStep {
            converter_id: format!("{from}-to-{to}"),
            from: from.into(),
            to: to.into(),
        }
    }

    fn three_hop_plan() -> Plan {
        Plan {
            steps: vec![step("a", "b"), step("b", "c"), step("c", "d")],
        }
    }

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn test_pipeline_success_removes_temporaries() {
        let mut registry = Registry::new();
        registry.register(append("a", "b"));
        registry.register(append("b", "c"));
        registry.register(append("c", "d"));

        let temp = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.a");
        let output = work.path().join("out.d");
        fs::write(&input, "x").unwrap();

        let ctx = ExecutionContext::new(Arc::new(registry)).with_temp_dir(temp.path());
        let result = SimpleExecutor::new()
            .execute(&ctx, &three_hop_plan(), &input, &output)
            .unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "x|b|c|d");
        assert_eq!(result.output, output);
        assert_eq!(result.stats.steps_executed, 3);
        assert_eq!(result.stats.temporaries, 2);
        assert_eq!(entries(temp.path()), 0);
    }

    #[test]
    fn test_failing_middle_hop_leaves_no_temporaries() {
        let mut registry = Registry::new();
        registry.register(append("a", "b"));
        registry.register(Fail {
            decl: ConverterDecl::new("b-to-c", "b", "c"),
        });
        registry.register(append("c", "d"));

        let temp = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.a");
        let output = work.path().join("out.d");
        fs::write(&input, "x").unwrap();

        let ctx = ExecutionContext::new(Arc::new(registry)).with_temp_dir(temp.path());
        let err = SimpleExecutor::new()
            .execute(&ctx, &three_hop_plan(), &input, &output)
            .unwrap_err();

        match err {
            ExecuteError::StepFailed {
                step, converter_id, ..
            } => {
                assert_eq!(step, 1);
                assert_eq!(converter_id, "b-to-c");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(entries(temp.path()), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_temporaries_carry_format_extension() {
        struct Check {
            decl: ConverterDecl,
        }

        impl Converter for Check {
            fn decl(&self) -> &ConverterDecl {
                &self.decl
            }

            fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
                let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !(name.starts_with("dtconvert") && name.ends_with(".b")) {
                    return Err(ConvertError::Failed(format!("unexpected input {name}")));
                }
                fs::write(output, "ok").map_err(|e| ConvertError::io(output, e))
            }
        }

        let mut registry = Registry::new();
        registry.register(append("a", "b"));
        registry.register(Check {
            decl: ConverterDecl::new("b-to-c", "b", "c"),
        });

        let temp = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.a");
        fs::write(&input, "x").unwrap();

        let ctx = ExecutionContext::new(Arc::new(registry)).with_temp_dir(temp.path());
        let plan = Plan {
            steps: vec![step("a", "b"), step("b", "c")],
        };
        SimpleExecutor::new()
            .execute(&ctx, &plan, &input, &work.path().join("out.c"))
            .unwrap();
    }

    #[test]
    fn test_sink_as_intermediate_is_rejected() {
        let mut registry = Registry::new();
        registry.register(Append {
            decl: ConverterDecl::new("a-to-b", "a", "b").sink(),
        });
        registry.register(append("b", "c"));

        let temp = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::new(Arc::new(registry)).with_temp_dir(temp.path());
        let plan = Plan {
            steps: vec![step("a", "b"), step("b", "c")],
        };

        let err = SimpleExecutor::new()
            .execute(&ctx, &plan, Path::new("in.a"), Path::new("out.c"))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::SinkNotFinal { step: 0, .. }));
        assert_eq!(entries(temp.path()), 0);
    }

    #[test]
    fn test_empty_plan() {
        let ctx = ExecutionContext::new(Arc::new(Registry::new()));
        let plan = Plan { steps: vec![] };

        let err = SimpleExecutor::new()
            .execute(&ctx, &plan, Path::new("a"), Path::new("b"))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::EmptyPlan));
    }

    #[test]
    fn test_declaration_without_implementation() {
        let mut registry = Registry::new();
        registry.register_decl(ConverterDecl::new("a-to-b", "a", "b"));

        let ctx = ExecutionContext::new(Arc::new(registry));
        let plan = Plan {
            steps: vec![step("a", "b")],
        };

        let err = SimpleExecutor::new()
            .execute(&ctx, &plan, Path::new("a"), Path::new("b"))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::ConverterNotFound(id) if id == "a-to-b"));
    }
}
