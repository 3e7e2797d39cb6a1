use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

mod args;
mod evaluate;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        Builder::from_env(Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    if let Err(e) = evaluate::run(&args) {
        eprintln!("An error occured: {}", e);
        std::process::exit(1);
    }
}
