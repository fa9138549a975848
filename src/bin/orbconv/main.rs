//! orbconv - convert 3D assets into ORB vertex/index files.

use std::env;
use std::io;

use orbconv::pipeline::{parse_args, usage, Command, Pipeline, Verbosity};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(Command::Help) => {
            println!("{}", usage());
            return;
        }
        Ok(Command::Convert(options)) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'orbconv -help' for usage.");
            std::process::exit(1);
        }
    };

    init_logging(options.verbosity);

    let result = Pipeline::new(options).and_then(|mut pipeline| {
        let stdout = io::stdout();
        pipeline.run(&mut stdout.lock())
    });
    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
