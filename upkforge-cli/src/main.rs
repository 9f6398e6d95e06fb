use clap::Parser;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "upkforge")]
#[command(about = "UE3 package (UPK) inspection and repackaging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
