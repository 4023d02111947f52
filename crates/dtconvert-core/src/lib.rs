//! dtconvert: route planning and pipelined execution for file conversions.
//!
//! Converters are edges of a format graph. Given a source and a target
//! format, the router uses a direct converter when one is registered and
//! otherwise plans the shortest chain of converters, running it hop by hop
//! through temporary files.

mod converter;
mod executor;
mod external;
mod planner;
mod registry;
mod router;

pub use converter::{ConvertError, Converter, ConverterDecl, Reference};
pub use executor::{
    ExecuteError, ExecutionContext, ExecutionResult, ExecutionStats, Executor, SimpleExecutor,
};
pub use external::{ExecutableResolver, ExternalConverter, HOME_ENV, is_executable};
pub use planner::{DEFAULT_MAX_DEPTH, FormatGraph, Plan, PlanStep, Planner};
pub use registry::Registry;
pub use router::{Conversion, Request, RouteError, Router};
