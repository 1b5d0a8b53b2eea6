// tests/registry_tests.rs
mod common;

use common::*;
use tiffin_core::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, Registry};

#[derive(Debug, Default)]
struct AlphaData {
  val: String,
}

#[derive(Debug, Default)]
struct BetaData {
  num: i32,
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  let mut alpha = Pipeline::<AlphaData, TestError>::new("alpha", &[("alpha_task", false, None)]);
  alpha.on("alpha_task", |ctx: ContextData<AlphaData>| async move {
    ctx.write().val = "alpha_processed".to_string();
    Ok::<_, FlowError>(PipelineControl::Continue)
  });
  registry.register(alpha);

  let mut beta = Pipeline::<BetaData, TestError>::new("beta", &[("beta_task", false, None)]);
  beta.on("beta_task", |ctx: ContextData<BetaData>| async move {
    ctx.write().num = 100;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register(beta);

  assert_eq!(registry.len(), 2);
  assert!(registry.is_registered::<AlphaData>());

  let alpha_ctx = ContextData::new(AlphaData::default());
  assert_eq!(registry.run(alpha_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(alpha_ctx.read().val, "alpha_processed");

  let beta_ctx = ContextData::new(BetaData::default());
  assert_eq!(registry.run(beta_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(beta_ctx.read().num, 100);
}

#[tokio::test]
async fn unregistered_type_is_reported() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  assert!(registry.is_empty());

  let result = registry.run(ContextData::new(BetaData::default())).await;

  match result {
    Err(TestError::Flow(FlowError::NotRegistered { type_name })) => assert!(type_name.contains("BetaData")),
    other => panic!("expected NotRegistered, got {other:?}"),
  }
}

#[tokio::test]
async fn registering_twice_replaces_the_pipeline() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  let mut first = Pipeline::<BetaData, TestError>::new("first", &[("set", false, None)]);
  first.on("set", |ctx: ContextData<BetaData>| async move {
    ctx.write().num = 1;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register(first);

  let mut second = Pipeline::<BetaData, TestError>::new("second", &[("set", false, None)]);
  second.on("set", |ctx: ContextData<BetaData>| async move {
    ctx.write().num = 2;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register(second);

  let ctx = ContextData::new(BetaData::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(registry.len(), 1);
  assert_eq!(ctx.read().num, 2);
}

#[tokio::test]
async fn pipeline_errors_convert_into_the_registry_error() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  let mut failing = Pipeline::<AlphaData, TestError>::new("failing", &[("fail", false, None)]);
  failing.on("fail", |_ctx: ContextData<AlphaData>| async move {
    Err::<PipelineControl, _>(TestError::Handler("nope".to_string()))
  });
  registry.register(failing);

  let result = registry.run(ContextData::new(AlphaData::default())).await;
  assert_eq!(result, Err(TestError::Handler("nope".to_string())));
}
