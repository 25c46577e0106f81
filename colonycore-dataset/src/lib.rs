mod binder;
mod param;
mod template;

pub use binder::{Binder, BoundTemplate, DatasetOutcome, Environment, Runner, RunOutcome, RunRequest, RunResult};
pub use param::{ParamDef, ParamError, ParamType, ParamValue};
pub use template::{Dialect, DatasetTemplate, OutputColumn, OutputFormat, TemplateDescriptor, TemplateMetadata};
