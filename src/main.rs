mod app;
mod color;
mod data;
mod render;
mod report;
mod state;

use std::io;
use std::path::PathBuf;

use clap::Parser;

use app::{Options, Outcome};

#[derive(Parser)]
#[command(name = "health-financing-dashboard")]
#[command(about = "Render an interactive health financing dashboard for one location", long_about = None)]
struct Cli {
    /// IHME health spending table (.csv or .parquet).
    #[arg(
        short,
        long,
        env = "HEALTH_SPENDING_CSV",
        default_value = "IHME_HEALTH_SPENDING_1995_2021.CSV"
    )]
    input: PathBuf,

    /// Location name or its number in the listing; prompted for when omitted.
    #[arg(short, long)]
    location: Option<String>,

    /// Directory the dashboard is written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the numbered location list and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let opts = Options {
        input: cli.input,
        location: cli.location,
        out_dir: cli.out_dir,
        list: cli.list,
    };

    match app::run(&opts, io::stdin().lock(), io::stdout().lock())? {
        Outcome::NotFound(location) => log::info!("no dashboard written for {location:?}"),
        Outcome::Written(path) => log::debug!("wrote {}", path.display()),
        Outcome::Listed => {}
    }

    Ok(())
}
