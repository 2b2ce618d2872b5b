mod session;
mod table;

use anyhow::Result;

use crate::cli::{Cli, Commands};

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::Commands(args) => {
			print!("{}", table::render(args.extensions));
			Ok(())
		}
		Commands::Session(args) => session::run(args).await,
	}
}
