use clap::Parser;
use log::info;
use snafu::ErrorCompat;

mod args;
mod contest;

fn main() {
    let args = args::Args::parse();
    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
    info!("Arguments: {:?}", args);

    if let Err(e) = contest::run_contest_cli(&args) {
        eprintln!("tidemancontest: error: {}", e);
        if let Some(backtrace) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", backtrace);
        }
        std::process::exit(1);
    }
}
