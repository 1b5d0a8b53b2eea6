// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use tiffin_core::{ContextData, FlowError, PipelineControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(FlowError),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(e)
  }
}

/// Appends `message` and records the step; stops the run when the context
/// asks to stop at this step.
pub async fn record_step(
  ctx: ContextData<TestContext>,
  step_name: &'static str,
  message: &'static str,
) -> Result<PipelineControl, TestError> {
  let mut guard = ctx.write();
  guard.counter += 1;
  guard.message.push_str(message);
  guard.steps_executed.push(step_name.to_string());
  tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
  if guard.should_stop_at.as_deref() == Some(step_name) {
    return Ok(PipelineControl::Stop);
  }
  Ok(PipelineControl::Continue)
}

pub async fn fail_step(
  ctx: ContextData<TestContext>,
  step_name: &'static str,
  error_message: &'static str,
) -> Result<PipelineControl, TestError> {
  ctx.write().steps_executed.push(step_name.to_string());
  Err(TestError::Handler(error_message.to_string()))
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
