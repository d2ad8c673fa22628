mod cli;
mod config;
mod run;
mod shaders;
mod timing;
mod window;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = config::resolve(&cli.run)?;
    match cli.command {
        Some(Command::Config) => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        None => run::run(config),
    }
}
