use crate::demo::{run_certificate, run_demo, CertificateArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use surgiscan::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SurgiScan",
    about = "Run the fitness-for-duty certification service or walk through it from the command line",
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
    /// Print the rendered certificate for one demo patient
    Certificate(CertificateArgs),
    /// Validate, assess and certify every patient in the demo cohort
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
    /// Preload the demo cohort into the in-memory examination store
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Certificate(args) => run_certificate(args),
        Command::Demo(args) => run_demo(args),
    }
}
