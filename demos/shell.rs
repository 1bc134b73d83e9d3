//! Interactive shell over a ranked view store.
//!
//! Reads one command per line from stdin (`getView`, `getAll`, `incre`,
//! `top`, `recent`) and prints the result in the selected format.
//!
//! Run with:
//! ```bash
//! printf 'incre a\nincre b\nincre b\ntop 2\n' | \
//!     cargo run --example shell --features demo -- --stats
//! RUST_LOG=classifica=debug cargo run --example shell --features demo
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use clap::{Parser, ValueEnum};
use classifica::observers::json::JsonObserver;
use classifica::observers::prometheus::PrometheusObserver;
use classifica::observers::table::{TableObserver, TableStyle};
use classifica::service::{Instrumented, Logged, MethodStats, ViewService};
use classifica::shell::{execute, Command, Outcome};
use classifica::{RankedCounterStore, StoreConfig, ViewCount};

/// Output format for command results.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty table
    Table,
    /// JSON
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

/// Command shell for classifica - ranked view counters.
///
/// Commands are read from stdin, one per line. Blank lines are ignored.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table format)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Preload the store with N threads of synthetic traffic
    #[arg(long)]
    simulate: Option<usize>,

    /// Increments per thread in simulation
    #[arg(long, default_value = "1000")]
    iterations: usize,

    /// Print per-method statistics on exit
    #[arg(long)]
    stats: bool,

    /// Print statistics in Prometheus format instead of a table
    #[arg(long)]
    prometheus: bool,

    /// Prometheus metric namespace (prefix)
    #[arg(long, default_value = "classifica")]
    namespace: String,

    /// Prometheus metric subsystem
    #[arg(long)]
    subsystem: Option<String>,

    /// Initial capacity of the store
    #[arg(long, default_value = "0")]
    capacity: usize,
}

type Service = Instrumented<Logged<RankedCounterStore>>;

/// Spreads `iterations` increments per thread over a skewed set of ids.
fn simulate_traffic(service: &Arc<Service>, num_threads: usize, iterations: usize) {
    let mut handles = vec![];

    for t in 0..num_threads {
        let service = Arc::clone(service);
        handles.push(thread::spawn(move || {
            for j in 0..iterations {
                // lower ids get more traffic
                let id = format!("video{}", (j * (t + 1)) % 7 % (j % 5 + 1));
                if let Err(e) = service.increment(&id) {
                    log::warn!("simulated increment failed: {}", e);
                }
            }
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            log::error!("simulation thread panicked");
        }
    }
}

fn print_list(args: &Args, views: &[ViewCount]) {
    match args.format {
        OutputFormat::Table => {
            let observer = TableObserver::new().with_style(args.style.into());
            println!("{}", observer.render_views(views));
        }
        OutputFormat::Json => {
            match JsonObserver::new().pretty(args.pretty).render_views(views) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("error: {}", e),
            }
        }
    }
}

fn print_stats(args: &Args, stats: &[MethodStats]) {
    if args.prometheus {
        let mut observer = PrometheusObserver::new().with_namespace(&args.namespace);
        if let Some(ref subsystem) = args.subsystem {
            observer = observer.with_subsystem(subsystem);
        }
        match observer.render(stats) {
            Ok(text) => print!("{}", text),
            Err(e) => eprintln!("error: {}", e),
        }
        return;
    }

    match args.format {
        OutputFormat::Table => {
            let observer = TableObserver::new()
                .with_style(args.style.into())
                .with_title("Requests");
            println!("{}", observer.render_stats(stats));
        }
        OutputFormat::Json => {
            match JsonObserver::new().pretty(args.pretty).render_stats(stats) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("error: {}", e),
            }
        }
    }
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let store = RankedCounterStore::with_config(StoreConfig::new().initial_capacity(args.capacity));
    let service: Arc<Service> = Arc::new(Instrumented::new(Logged::new(store)));

    if let Some(threads) = args.simulate {
        simulate_traffic(&service, threads, args.iterations);
        log::info!(
            "preloaded {} ids from {} threads",
            service.inner().inner().len(),
            threads
        );
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        match execute(&*service, &command) {
            Ok(Outcome::Views(views)) => println!("{}", views),
            Ok(Outcome::List(list)) => print_list(&args, &list),
            Ok(Outcome::Done) => println!("ok"),
            Err(e) => eprintln!("error: {}", e),
        }
        io::stdout().flush()?;
    }

    if args.stats || args.prometheus {
        print_stats(&args, &service.stats());
    }

    Ok(())
}
