use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding stored statistics, hitboxes and pending logs.
    #[arg(global = true, short, long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store initial hitboxes from a KLE layout file.
    Seed(cmd::seed::SeedArgs),
    /// Queue synthetic touch logs around the stored hitboxes.
    Simulate(cmd::simulate::SimulateArgs),
    /// Run one learning pass over the queued logs.
    Learn(cmd::learn::LearnArgs),
    /// Print the stored hitboxes and statistics of a keyboard.
    Show(cmd::show::ShowArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let result = match cli.command {
        Commands::Seed(args) => cmd::seed::run(&cli.data_dir, args),
        Commands::Simulate(args) => cmd::simulate::run(&cli.data_dir, args),
        Commands::Learn(args) => {
            cmd::learn::run(&cli.data_dir, args, matches.subcommand_matches("learn"))
        }
        Commands::Show(args) => cmd::show::run(&cli.data_dir, args),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
