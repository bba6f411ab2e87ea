use clap::Parser;
use symshake::cli::{self, Cli};
use symshake::config::Settings;

fn main() {
    let cli = Cli::parse();

    let logging = Settings::load()
        .map(|s| s.logging)
        .unwrap_or_default();
    symshake::logging::init_with_config(&logging);

    if let Err(err) = cli::run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
