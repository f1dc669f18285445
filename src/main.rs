use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use engine::prelude::*;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

mod run;
mod view;

pub const GAME_NAME: &str = "stealthgrid";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, help = "Game world seed")]
    seed: Option<String>,

    #[arg(long, help = "Session configuration file")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 50, help = "Give up after this many turns")]
    turns: u32,

    #[arg(long, help = "Print the map after every turn")]
    frames: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config: SessionConfig = match &args.config {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?
            .parse()?,
        None => SessionConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if config.seed.is_empty() {
        config.seed = format!("{:08x}", rand::random::<u32>());
    }
    log::info!("{GAME_NAME} seed: {}", config.seed);

    let mut session = Session::new(config)?;
    println!("{}", view::render(&session));

    let outcome = run::autopilot(&mut session, args.turns, |s| {
        if args.frames {
            println!("{}", view::render(s));
        }
    });

    println!("{}", view::render(&session));
    println!("{outcome}");
    Ok(())
}
