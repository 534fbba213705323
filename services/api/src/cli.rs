use crate::demo::{run_demo, run_select, DemoArgs, SelectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use promotion_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Promotion Review",
    about = "Run promotion candidate selection as a service or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one selection pass over the sample roster and print the candidates
    Select(SelectArgs),
    /// Walk through eligibility, selection and a background recalculation
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Select(args) => run_select(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
