//! Benchmarks for order selection, model fitting and a full pipeline run.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ridership_forecast::core::TimeSeries;
use ridership_forecast::data::RawTable;
use ridership_forecast::models::arima::{select_order, SarimaFitter, SeasonalOrder, SelectionConfig};
use ridership_forecast::pipeline::{ForecastPipeline, PipelineConfig};
use ridership_forecast::sink::MemorySink;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn generate_ridership(n: usize, seed: u64) -> Vec<f64> {
    let week = [1.0, 1.05, 1.02, 1.0, 1.1, 0.45, 0.3];
    let mut state = seed;
    (0..n)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let noise = (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5;
            5000.0 * week[i % 7] + 2.0 * i as f64 + 400.0 * noise
        })
        .collect()
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_selection");

    for size in [180, 365, 730, 1460].iter() {
        let series = TimeSeries::from_start("Light Rail", start(), generate_ridership(*size, 7)).unwrap();
        let config = SelectionConfig::default();

        group.bench_with_input(BenchmarkId::new("heuristic", size), size, |b, _| {
            b.iter(|| select_order(black_box(&series), &config))
        });
    }

    group.finish();
}

fn bench_fitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");
    group.sample_size(20);

    let orders = [
        ("arima_110", SeasonalOrder::arima(1, 1, 0)),
        ("sarima_101_011_7", SeasonalOrder::new(1, 0, 1, 0, 1, 1, 7).unwrap()),
        ("sarima_211_111_7", SeasonalOrder::new(2, 1, 1, 1, 1, 1, 7).unwrap()),
    ];

    for size in [365, 1460].iter() {
        let series = TimeSeries::from_start("Rapid Route", start(), generate_ridership(*size, 11)).unwrap();
        let fitter = SarimaFitter::default();

        for (name, order) in orders.iter() {
            group.bench_with_input(BenchmarkId::new(*name, size), size, |b, _| {
                b.iter(|| fitter.fit_with_fallback(black_box(&series), *order))
            });
        }
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let services = ["Local Route", "Light Rail", "Peak Service", "Rapid Route", "School", "Other"];
    let columns: Vec<Vec<f64>> = (0..services.len())
        .map(|i| generate_ridership(730, i as u64 + 1))
        .collect();
    let mut headers = vec!["Date".to_string()];
    headers.extend(services.iter().map(|s| s.to_string()));
    let rows = (0..730)
        .map(|t| {
            let date = start() + chrono::Duration::days(t as i64);
            let mut row = vec![date.format("%Y-%m-%d").to_string()];
            row.extend(columns.iter().map(|c| format!("{:.0}", c[t])));
            row
        })
        .collect();
    let table = RawTable::new("Date", headers, rows).unwrap();
    let run_date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

    for parallel in [false, true] {
        let pipeline = ForecastPipeline::new(PipelineConfig {
            parallel,
            ..Default::default()
        });
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| pipeline.run(black_box(&table), run_date, &mut MemorySink::new()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_selection, bench_fitting, bench_pipeline);
criterion_main!(benches);
