// core/src/flow/error.rs
use thiserror::Error;

/// Failures raised by the pipeline machinery itself, as opposed to the
/// business errors returned by step handlers.
///
/// A pipeline's error type must be `From<FlowError>` so these can surface
/// through the same `Result` as handler errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
  #[error("step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("no handler registered for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("no pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("context type mismatch, expected {expected_type}")]
  TypeMismatch { expected_type: String },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
