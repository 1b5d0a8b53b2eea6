use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tiffin_core::domain::analytics::{rank_restaurants, summarize_orders, OrderFact, Ratios};
use tiffin_core::{ContextData, FeeSchedule, FlowError, OrderStatus, Pipeline, PipelineControl};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[derive(Debug, Default)]
struct CheckoutBench {
  lines: Vec<(i64, i32)>,
  total_cents: i64,
}

fn synthetic_orders(count: usize, restaurants: usize) -> Vec<OrderFact> {
  let restaurant_ids: Vec<Uuid> = (0..restaurants).map(|_| Uuid::new_v4()).collect();
  let fees = FeeSchedule::default();
  (0..count)
    .map(|i| {
      let total_cents = 5_000 + (i as i64 * 137) % 60_000;
      OrderFact {
        restaurant_id: restaurant_ids[i % restaurants],
        status: OrderStatus::ALL[i % OrderStatus::ALL.len()],
        total_cents,
        service_fee_cents: fees.service_fee(total_cents).unwrap(),
      }
    })
    .collect()
}

fn bench_dashboard_aggregation(c: &mut Criterion) {
  let mut group = c.benchmark_group("DashboardAggregation");

  for order_count in [1_000usize, 10_000, 100_000].iter() {
    let facts = synthetic_orders(*order_count, 50);
    group.throughput(Throughput::Elements(*order_count as u64));

    group.bench_with_input(BenchmarkId::new("summarize", order_count), &facts, |b, facts| {
      b.iter(|| {
        let totals = summarize_orders(facts);
        criterion::black_box(Ratios::compute(&totals, 500))
      })
    });

    group.bench_with_input(BenchmarkId::new("rank_top5", order_count), &facts, |b, facts| {
      b.iter(|| criterion::black_box(rank_restaurants(facts, 5)))
    });
  }
  group.finish();
}

fn bench_checkout_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("CheckoutPipeline");
  let rt = Runtime::new().unwrap();

  let mut pipeline = Pipeline::<CheckoutBench, FlowError>::new("bench_checkout", &[("price", false, None)]);
  pipeline.on("price", |ctx: ContextData<CheckoutBench>| async move {
    let mut data = ctx.write();
    if let Ok(priced) = FeeSchedule::default().price_lines(data.lines.iter().copied()) {
      data.total_cents = priced.total_cents;
    }
    Ok::<_, FlowError>(PipelineControl::Continue)
  });
  let pipeline = Arc::new(pipeline);

  for line_count in [1usize, 10, 50].iter() {
    group.bench_with_input(BenchmarkId::new("lines", line_count), line_count, |b, &line_count| {
      b.to_async(&rt).iter_batched(
        || {
          ContextData::new(CheckoutBench {
            lines: (0..line_count).map(|i| (1_000 + i as i64, 1 + (i % 3) as i32)).collect(),
            total_cents: 0,
          })
        },
        |ctx| {
          let p = pipeline.clone();
          async move { p.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

criterion_group!(benches, bench_dashboard_aggregation, bench_checkout_pipeline);
criterion_main!(benches);
