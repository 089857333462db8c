use clap::Parser;
use hashviz::logger::initialize_logger;
use hashviz::{
    parse_key, parse_keys, Config, EventSink, Mode, OperationOutcome, Visualizer,
    VisualizerConfig,
};
use hashviz::config::visualizer::MAX_SPEED_LEVEL;
use hashviz::playback::SystemClock;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const POLL_PERIOD: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of buckets/slots per table
    #[arg(short, long)]
    size: Option<usize>,

    /// Primary hash expression over `key` and `tableSize`
    #[arg(short, long)]
    primary: Option<String>,

    /// Secondary hash expression for double hashing
    #[arg(long)]
    secondary: Option<String>,

    /// Initial mode: chain, linear, quad or double
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Milliseconds between steps during playback
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn on_trace_event(&mut self, text: &str) {
        println!("  {}", text);
    }

    fn on_operation_outcome(&mut self, outcome: &OperationOutcome) {
        println!("=> {}", outcome);
    }
}

type ConsoleVisualizer = Visualizer<SystemClock, ConsoleSink>;

fn load_config(args: &Args) -> hashviz::Result<VisualizerConfig> {
    let mut config = match &args.config {
        Some(path) => VisualizerConfig::load_from_file(path)?,
        None => VisualizerConfig::from_env()?,
    };
    if let Some(size) = args.size {
        config.table_size = size;
    }
    if let Some(primary) = &args.primary {
        config.primary_expr = primary.clone();
    }
    if let Some(secondary) = &args.secondary {
        config.secondary_expr = secondary.clone();
    }
    if let Some(mode) = args.mode {
        config.initial_mode = mode;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.step_interval_ms = interval_ms;
    }
    config.validate()?;
    Ok(config)
}

fn display_help() {
    println!("Commands:");
    println!("  insert <k1,k2,...>   queue insertions into the current mode");
    println!("  search <k>           queue a search");
    println!("  delete <k>           queue a deletion");
    println!("  mode <m>             switch to chain, linear, quad or double");
    println!("  step                 execute one queued action");
    println!("  play                 execute queued actions at the configured speed");
    println!(
        "  speed <0-{}>         set playback speed level",
        MAX_SPEED_LEVEL
    );
    println!("  reset                clear every table, queue and the trace");
    println!("  init <size> [h1] [h2]  rebuild the tables");
    println!("  show                 print the current table");
    println!("  compare <k>          search every table at once");
    println!("  trace                print the trace log");
    println!("  quit                 exit");
}

/// Run playback in the foreground until the queue drains.
fn play_blocking(viz: &mut ConsoleVisualizer) -> hashviz::Result<()> {
    viz.play();
    while viz.playback_state() == hashviz::PlaybackState::Running {
        viz.poll()?;
        thread::sleep(POLL_PERIOD);
    }
    Ok(())
}

fn execute_command(viz: &mut ConsoleVisualizer, line: &str) -> Result<bool, Box<dyn Error>> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "" => {}
        "help" | "?" => display_help(),
        "quit" | "exit" => return Ok(false),
        "insert" | "i" => {
            let keys = parse_keys(rest)?;
            let queued = viz.request_insert(&keys, viz.mode())?;
            println!("queued {} actions", queued);
        }
        "search" | "s" => {
            let queued = viz.request_search(parse_key(rest)?, viz.mode());
            println!("queued {} actions", queued);
        }
        "delete" | "d" => {
            let queued = viz.request_delete(parse_key(rest)?, viz.mode());
            println!("queued {} actions", queued);
        }
        "mode" | "m" => {
            viz.set_mode(rest.parse()?);
            println!("{}", viz.notice());
        }
        "step" | "n" => {
            if viz.step()?.is_none() {
                println!("(queue empty)");
            }
        }
        "play" | "p" => play_blocking(viz)?,
        "pause" => viz.pause(),
        "speed" => {
            let level: u32 = rest.parse()?;
            viz.set_speed_level(level);
            println!("step interval {}ms", viz.config().step_interval_ms);
        }
        "reset" => {
            viz.reset()?;
            println!("{}", viz.notice());
        }
        "init" => {
            let mut parts = rest.split_whitespace();
            let size = VisualizerConfig::table_size_from_input(parts.next().unwrap_or(""));
            let primary = parts.next().unwrap_or("").to_string();
            let secondary = parts.next().unwrap_or("").to_string();
            viz.initialize(size, &primary, &secondary)?;
            println!("{}", viz.notice());
        }
        "show" => print!("{}", viz.snapshot(viz.mode())),
        "compare" | "c" => {
            let key = parse_key(rest)?;
            for (mode, found) in viz.compare_search(key) {
                match found {
                    Some(idx) => println!("{:<20} found at {}", mode.title(), idx),
                    None => println!("{:<20} not found", mode.title()),
                }
            }
        }
        "trace" => {
            for line in viz.trace().lines() {
                println!("  {}", line);
            }
        }
        other => println!("unknown command '{}', try 'help'", other),
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn Error>> {
    initialize_logger();
    hashviz::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut viz = Visualizer::with_parts(config, SystemClock::new(), ConsoleSink)?;
    println!("{}", viz.notice());
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("hashviz> ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match execute_command(&mut viz, &line) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}
