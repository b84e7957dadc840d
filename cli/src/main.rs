mod commands;
mod report;
mod terminal;

use commands::{CommandLine, Commands, agent, discover};
use lanprobe_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);

    match commands.command {
        Commands::Discover(args) => {
            let cfg = Config {
                no_dns: args.no_dns,
                quiet: commands.quiet,
                json: args.json,
            };
            if !cfg.quiet {
                print::header("getting ready for discovery");
            }
            discover::discover(args, &cfg).await
        }
        Commands::Agent(args) => {
            let cfg = Config {
                quiet: commands.quiet,
                ..Config::default()
            };
            if !cfg.quiet {
                print::header("agent mode");
            }
            agent::agent(args, &cfg).await
        }
    }
}
