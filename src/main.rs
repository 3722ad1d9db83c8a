use bfrun::cli_util::init_logging;
use bfrun::commands::run::{self, RunArgs};
use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "bfrun", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfrun"));

    let cli = Cli::parse();
    let code = run::run(&program, cli.run);

    std::process::exit(code);
}
