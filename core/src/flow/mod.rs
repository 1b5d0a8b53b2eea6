//! Step-pipeline engine used to express multi-step request workflows
//! (registration, login, checkout, status changes) as named, traceable steps.

pub mod context_data;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use error::{FlowError, FlowResult};
pub use pipeline::{Handler, Pipeline, SkipCondition, StepDef};
pub use registry::Registry;
