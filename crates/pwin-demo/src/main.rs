#![forbid(unsafe_code)]

//! Headless demo: mounts a window over a paged photo source and scrolls it
//! in fixed steps, printing the active window after each step.

mod cli;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use pwin::prelude::*;
use pwin::{GridLayout, PicsumSource, SyntheticSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Opts, SourceKind};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    if let Err(err) = run(&opts) {
        eprintln!("pwin-demo: {err}");
        process::exit(1);
    }
}

fn build_source(opts: &Opts) -> pwin::Result<Arc<dyn PageSource>> {
    Ok(match opts.source {
        SourceKind::Synthetic => {
            let mut source =
                SyntheticSource::new().with_latency(Duration::from_millis(opts.latency_ms));
            if opts.pages > 0 {
                source = source.with_total_pages(opts.pages);
            }
            Arc::new(source)
        }
        SourceKind::Picsum => Arc::new(
            PicsumSource::new().map_err(|e| std::io::Error::other(e.to_string()))?,
        ),
    })
}

fn run(opts: &Opts) -> pwin::Result<()> {
    let mut config = WindowConfig::from_env().with_viewport(opts.height, opts.width);
    if let Some(start) = opts.start_page {
        config = config.with_start_page(PageNumber::new(start)?);
    }
    let loader = PaginatedLoader::from_shared(build_source(opts)?, config.page_size);
    let layout = Layout::Grid(GridLayout::new(opts.row_height));
    let mut window = WindowCoordinator::with_loader(loader, config).with_layout(layout);

    window.mount();
    settle(&mut window);
    info!(records = window.store().len(), "initial load settled");

    let mut offset = 0.0_f64;
    report(&window, 0, offset, opts.json);
    for step in 1..=opts.steps {
        offset = scroll_to(&mut window, offset + opts.step);
        report(&window, step, offset, opts.json);
    }
    if opts.bounce {
        for step in 1..=opts.steps {
            offset = scroll_to(&mut window, (offset - opts.step).max(0.0));
            report(&window, opts.steps + step, offset, opts.json);
        }
    }

    let stats = window.loader().stats();
    window.teardown();
    if opts.json {
        println!(
            "{}",
            serde_json::json!({
                "dispatched": stats.dispatched,
                "merged": stats.merged,
                "failed": stats.failed,
                "discarded": stats.discarded,
            })
        );
    } else {
        println!(
            "fetches: {} dispatched, {} merged, {} failed",
            stats.dispatched, stats.merged, stats.failed
        );
    }
    Ok(())
}

/// Scroll to `offset` (clamped to the content), wait for fetches, and
/// return the offset after any prepend correction.
fn scroll_to(window: &mut WindowCoordinator, offset: f64) -> f64 {
    let max = (window.window().total_extent - window.viewport().size).max(0.0);
    window.handle(ViewportSignal::Scroll {
        offset: offset.min(max),
    });
    settle(window);
    window.take_scroll_correction();
    window.viewport().scroll_offset
}

fn settle(window: &mut WindowCoordinator) {
    while window.snapshot().is_loading {
        if window.wait_for_completion(SETTLE_TIMEOUT).is_empty() {
            warn!("timed out waiting for a page");
            break;
        }
    }
}

fn report(window: &WindowCoordinator, step: u32, offset: f64, json: bool) {
    let snap = window.snapshot();
    let state = window.window();
    let store = window.store();
    let pages = match (store.min_page(), store.max_page()) {
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        _ => "-".to_owned(),
    };
    if json {
        let ids: Vec<&str> = snap.visible_items.iter().map(|r| r.id.as_str()).collect();
        println!(
            "{}",
            serde_json::json!({
                "step": step,
                "offset": offset,
                "rows": [state.units.start, state.units.end],
                "items": [state.items.start, state.items.end],
                "window_offset": snap.window_offset_from_top,
                "total_extent": snap.total_extent,
                "pages": pages,
                "loading": snap.is_loading,
                "error": snap.error,
                "visible_ids": ids,
            })
        );
    } else {
        println!(
            "step {step:>3}  offset {offset:>8.0}  rows {:>4}..{:<4}  items {:>5}..{:<5}  total {:>8.0}  pages {pages}{}",
            state.units.start,
            state.units.end,
            state.items.start,
            state.items.end,
            snap.total_extent,
            snap.error.map(|e| format!("  error: {e}")).unwrap_or_default(),
        );
    }
}
