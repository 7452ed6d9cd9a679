use clap::Parser;
use pf_ledger::api::{Cli, Command, run_http_server, run_ledger_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pf_ledger::telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => run_http_server(&args.host, args.port).await?,
        Command::Ledger(args) => {
            let statement = run_ledger_command(&args)?;
            print!("{statement}");
        }
    }

    Ok(())
}
