//! Walk the same keys through all four collision resolution modes.
//!
//! Run with `cargo run --example basic_usage`.

use hashviz::logger::initialize_logger;
use hashviz::{
    ManualClock, Mode, OutcomeKind, RecordingSink, SearchTermination, Visualizer,
    VisualizerConfig,
};

fn main() -> hashviz::Result<()> {
    initialize_logger();

    let config = VisualizerConfig::builder()
        .table_size(7)
        .step_interval_ms(250)
        .search_termination(SearchTermination::FullScan)
        .build()?;
    let clock = ManualClock::new();
    let mut viz = Visualizer::with_parts(config, clock.clone(), RecordingSink::new())?;
    println!("{}", viz.notice());

    let keys = [10, 17, 24, 3, 31];
    for mode in Mode::ALL {
        println!("\n=== {} ===", mode.title());
        viz.request_insert(&keys, mode)?;

        // Timed playback on a logical clock: one step per 250ms tick
        viz.play();
        while viz.pending(mode) > 0 {
            clock.advance_by(250);
            viz.poll()?;
        }
        viz.pause();

        for line in viz.trace().lines() {
            println!("  {}", line);
        }
        print!("{}", viz.snapshot(mode));
        println!(
            "load factor {:.2}, {} failed insertions",
            viz.table().load_factor(mode),
            viz.sink()
                .outcomes
                .iter()
                .filter(|o| o.mode == mode && o.kind == OutcomeKind::Failed)
                .count()
        );
    }

    println!("\n=== search 24 everywhere ===");
    for (mode, found) in viz.compare_search(24) {
        match found {
            Some(idx) => println!("{:<20} found at {}", mode.title(), idx),
            None => println!("{:<20} not found", mode.title()),
        }
    }

    Ok(())
}
