use std::process::ExitCode;

use clap::Parser;
use tilepaint::cli::{self, CliArgs};
use tilepaint::logger;
use tilepaint::settings::AppSettings;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let mut settings = AppSettings::load();

    // Initialize session log (overwrites previous session log)
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        settings.level_filter()
    };
    logger::init(level, true);

    cli::run(args, &mut settings)
}
