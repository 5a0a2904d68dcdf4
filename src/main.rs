use clap::Parser;
use ma200::cli::{init_tracing, run, Cli};

fn main() -> std::process::ExitCode {
    init_tracing();
    run(Cli::parse())
}
