//! `gol`: runs the engine against PGM files, keys from stdin, events to stdout.
//!
//! ```text
//! gol [-t N] [-w W] [-h H] [--turns N] [--images DIR] [--out DIR] [--verbose]
//! ```
//!
//! Keys (one per line): `p` pause/resume, `s` snapshot, `q` snapshot and quit.
//! Ctrl-C, SIGTERM and SIGQUIT behave like `q`.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, builder::RangedU64ValueParser};
use gol_engine::{
    Config, DEFAULT_IMAGES_DIR, DEFAULT_OUT_DIR, Engine, LogWriter, Subscribe, SubscriberSet,
    cancel_on_signal,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Runs Conway's Game of Life on a PGM image with a pool of workers.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Number of workers computing bands in parallel.
    #[arg(
        short = 't',
        long,
        value_name = "N",
        default_value_t = Config::default().threads,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    threads: usize,
    /// Grid width in cells.
    #[arg(
        short = 'w',
        long,
        value_name = "CELLS",
        default_value_t = Config::default().image_width,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    width: usize,
    /// Grid height in cells.
    #[arg(
        short = 'h',
        long,
        value_name = "CELLS",
        default_value_t = Config::default().image_height,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    height: usize,
    /// Number of turns to compute.
    #[arg(long, value_name = "N", default_value_t = Config::default().turns)]
    turns: u32,
    /// Directory the input image is read from.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_IMAGES_DIR)]
    images: PathBuf,
    /// Directory snapshots are written to.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    out: PathBuf,
    /// Also print every completed turn.
    #[arg(short = 'v', long)]
    verbose: bool,
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            turns: self.turns,
            threads: self.threads,
            image_width: self.width,
            image_height: self.height,
            ..Config::default()
        }
    }
}

/// Feeds stdin keys to the engine from a plain thread, so a pending read never
/// holds the runtime open. The sender is dropped at end of input.
fn spawn_key_reader(keys: mpsc::Sender<char>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars().filter(|c| !c.is_whitespace()) {
                if keys.blocking_send(key).is_err() {
                    return;
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let cfg = args.config();

    let log = if args.verbose {
        LogWriter::new().with_turns()
    } else {
        LogWriter::new()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(log)];
    let (events_tx, events) = cfg.event_channel();
    let observer = tokio::spawn(SubscriberSet::new(subs).forward(events));

    let (keys_tx, keys) = mpsc::channel::<char>(16);
    spawn_key_reader(keys_tx);

    let token = CancellationToken::new();
    let signals = cancel_on_signal(token.clone());

    let engine = Engine::builder(cfg)
        .with_pgm_dirs(args.images, args.out)
        .build();
    let res = engine.run_with_cancel(events_tx, keys, token.clone()).await;

    token.cancel();
    let _ = signals.await;
    let _ = observer.await;

    match res {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[error] {}: {}", e.as_label(), e.as_message());
            ExitCode::FAILURE
        }
    }
}
