//! Layout benchmark: measures full-list packing plus windowed relayout cost
//! over synthetic gallery items.

use std::env;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use rowfit::{CachedLayoutComputer, GalleryItem, JustifiedLayout};

#[derive(Debug, Clone)]
struct BenchArgs {
    items: usize,
    runs: usize,
    row_width: f32,
    target_height: f32,
    item_spacing: f32,
}

#[derive(Debug)]
struct BenchRun {
    run_index: usize,
    layout_total_ms: f64,
    frames_simulated: usize,
    frame_p50_ms: f64,
    frame_p95_ms: f64,
    warm_cache_ms: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rowfit=info".parse().unwrap()),
        )
        .init();

    let args = parse_args()?;
    let items = synthetic_items(args.items);
    let layout = JustifiedLayout::new(args.row_width, args.target_height, args.item_spacing);

    let mut runs = Vec::with_capacity(args.runs);
    for run_index in 1..=args.runs {
        println!("run={} phase=begin items={}", run_index, items.len());

        let layout_start = Instant::now();
        let display = layout
            .build_rows(&items)
            .context("Full-list layout failed")?;
        let layout_total_ms = layout_start.elapsed().as_secs_f64() * 1000.0;
        let extent = layout
            .total_height(&items, args.item_spacing)
            .context("Extent computation failed")?;
        println!(
            "run={} phase=layout done items={} extent_px={:.0} ms={:.3}",
            run_index,
            display.len(),
            extent,
            layout_total_ms
        );

        let (frames_simulated, frame_p50_ms, frame_p95_ms) =
            simulate_layout_snappiness(&layout, &items)?;
        println!(
            "run={} phase=frames done frames={} p50_ms={:.3} p95_ms={:.3}",
            run_index, frames_simulated, frame_p50_ms, frame_p95_ms
        );

        let computer = CachedLayoutComputer::with_layout(layout.clone());
        let _ = computer
            .compute(&items, args.row_width)
            .context("Cold cache layout failed")?;
        let warm_start = Instant::now();
        let _ = computer
            .compute(&items, args.row_width)
            .context("Warm cache layout failed")?;
        let warm_cache_ms = warm_start.elapsed().as_secs_f64() * 1000.0;
        println!(
            "run={} phase=cache done warm_ms={:.3}",
            run_index, warm_cache_ms
        );

        runs.push(BenchRun {
            run_index,
            layout_total_ms,
            frames_simulated,
            frame_p50_ms,
            frame_p95_ms,
            warm_cache_ms,
        });
    }

    let layout_values: Vec<f64> = runs.iter().map(|r| r.layout_total_ms).collect();
    let p95_values: Vec<f64> = runs.iter().map(|r| r.frame_p95_ms).collect();
    let warm_values: Vec<f64> = runs.iter().map(|r| r.warm_cache_ms).collect();
    println!(
        "runs={} avg_layout_ms={:.3} avg_frame_p95_ms={:.3} avg_warm_cache_ms={:.3}",
        runs.len(),
        average(&layout_values),
        average(&p95_values),
        average(&warm_values)
    );
    for run in &runs {
        println!(
            "run={} layout_ms={:.3} frames={} p50_ms={:.3} p95_ms={:.3} warm_ms={:.3}",
            run.run_index,
            run.layout_total_ms,
            run.frames_simulated,
            run.frame_p50_ms,
            run.frame_p95_ms,
            run.warm_cache_ms
        );
    }

    Ok(())
}

fn parse_args() -> Result<BenchArgs> {
    let mut parsed = BenchArgs {
        items: 10_000,
        runs: 3,
        row_width: 1920.0,
        target_height: 220.0,
        item_spacing: 4.0,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--items" => {
                let value = args.next().context("Missing value for --items")?;
                parsed.items = value
                    .parse::<usize>()
                    .context("Failed to parse --items as a positive integer")?;
            }
            "--runs" => {
                let value = args.next().context("Missing value for --runs")?;
                parsed.runs = value
                    .parse::<usize>()
                    .context("Failed to parse --runs as a positive integer")?;
            }
            "--row-width" => {
                let value = args.next().context("Missing value for --row-width")?;
                parsed.row_width = value
                    .parse::<f32>()
                    .context("Failed to parse --row-width as a number")?;
            }
            "--target-height" => {
                let value = args.next().context("Missing value for --target-height")?;
                parsed.target_height = value
                    .parse::<f32>()
                    .context("Failed to parse --target-height as a number")?;
            }
            "--spacing" => {
                let value = args.next().context("Missing value for --spacing")?;
                parsed.item_spacing = value
                    .parse::<f32>()
                    .context("Failed to parse --spacing as a number")?;
            }
            other => bail!("Unknown argument: {other}"),
        }
    }

    if parsed.items == 0 {
        bail!("--items must be greater than 0");
    }
    if parsed.runs == 0 {
        bail!("--runs must be greater than 0");
    }

    Ok(parsed)
}

/// Synthetic descriptors over common camera and screen shapes, cycled
/// deterministically so runs are comparable.
fn synthetic_items(count: usize) -> Vec<GalleryItem> {
    const DIMENSIONS: [(f32, f32); 8] = [
        (1920.0, 1080.0),
        (1080.0, 1920.0),
        (1000.0, 1000.0),
        (2560.0, 1080.0),
        (3000.0, 2000.0),
        (800.0, 1200.0),
        (1600.0, 900.0),
        (4000.0, 3000.0),
    ];

    (0..count)
        .map(|i| {
            let (w, h) = DIMENSIONS[i % DIMENSIONS.len()];
            GalleryItem::new(w, h)
        })
        .collect()
}

/// Re-lays-out a sliding window over the item list, approximating the work a
/// scrolling gallery does per frame, and reports per-frame percentiles.
fn simulate_layout_snappiness(
    layout: &JustifiedLayout,
    items: &[GalleryItem],
) -> Result<(usize, f64, f64)> {
    let window_size = 180usize.min(items.len());
    let step = (window_size / 6).max(1);
    let mut frame_times_ms = Vec::new();

    let mut idx = 0usize;
    while idx < items.len() {
        let end = (idx + window_size).min(items.len());
        let frame_start = Instant::now();
        let _ = layout
            .build_rows(&items[idx..end])
            .context("Windowed layout failed")?;
        frame_times_ms.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        if end == items.len() {
            break;
        }
        idx += step;
    }

    Ok((
        frame_times_ms.len(),
        percentile_ms(&frame_times_ms, 0.50),
        percentile_ms(&frame_times_ms, 0.95),
    ))
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_ms(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let clamped = p.clamp(0.0, 1.0);
    let idx = ((sorted.len() - 1) as f64 * clamped).round() as usize;
    sorted[idx]
}
