//! `orrery`: animate a sun, a planet and a moon.

use clap::Parser;
use orrery_config::CliArgs;

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = orrery_app::bootstrap::run(&args) {
        tracing::error!("{e}");
        eprintln!("orrery: {e}");
        std::process::exit(1);
    }
}
