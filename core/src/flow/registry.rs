// core/src/flow/registry.rs

//! `Registry<AppErr>`: pipelines keyed by the type of data they run over.
//!
//! Callers hold one registry, register each workflow once at startup and then
//! dispatch with `registry.run(ContextData::new(data))`; the data type picks
//! the pipeline.

use crate::flow::context_data::ContextData;
use crate::flow::control::PipelineResult;
use crate::flow::error::FlowError;
use crate::flow::pipeline::Pipeline;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedPipeline<AppErr>: Send + Sync {
  fn name(&self) -> &str;

  /// `ctx` must be a boxed `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct Registered<TData, PipeErr, AppErr>
where
  TData: Send + Sync + 'static,
  PipeErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, PipeErr>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, PipeErr, AppErr> ErasedPipeline<AppErr> for Registered<TData, PipeErr, AppErr>
where
  TData: Send + Sync + 'static,
  PipeErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<PipeErr> + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    self.pipeline.name()
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = ctx.downcast::<ContextData<TData>>().map_err(|_| {
      AppErr::from(FlowError::TypeMismatch {
        expected_type: std::any::type_name::<ContextData<TData>>().to_string(),
      })
    })?;
    self.pipeline.run(*ctx_data).await.map_err(AppErr::from)
  }
}

pub struct Registry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<AppErr>>>>,
}

impl<AppErr> Default for Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its data type, replacing any earlier one.
  pub fn register<TData, PipeErr>(&self, pipeline: Pipeline<TData, PipeErr>)
  where
    TData: Send + Sync + 'static,
    PipeErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<PipeErr>,
  {
    event!(
      Level::DEBUG,
      pipeline = pipeline.name(),
      data_type = std::any::type_name::<TData>(),
      "registering pipeline"
    );
    let entry: Arc<dyn ErasedPipeline<AppErr>> = Arc::new(Registered::<TData, PipeErr, AppErr> {
      pipeline,
      _app_err: PhantomData,
    });
    if let Some(previous) = self.pipelines.write().insert(TypeId::of::<TData>(), entry) {
      event!(Level::WARN, replaced = previous.name(), "pipeline replaced");
    }
  }

  pub fn is_registered<TData: Send + Sync + 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  pub fn len(&self) -> usize {
    self.pipelines.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipelines.read().is_empty()
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: Send + Sync + 'static,
  {
    let entry = self.pipelines.read().get(&TypeId::of::<TData>()).cloned();
    let entry = entry.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, data_type = type_name, "no pipeline registered");
      AppErr::from(FlowError::NotRegistered {
        type_name: type_name.to_string(),
      })
    })?;
    entry.run_erased(Box::new(ctx_data)).await
  }
}
