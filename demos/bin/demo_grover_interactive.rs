//! Interactive Grover search: asks for the secret and the mode.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::{Term, style};
use tracing_subscriber::EnvFilter;

use qrun_demos::present::{print_header, print_report};
use qrun_demos::{ExecutionMode, Pipeline, ServiceConfig};

#[derive(Parser)]
#[command(name = "demo-grover-interactive")]
#[command(about = "Grover search with prompted secret and mode", version)]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    service: ServiceConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    print_header("Grover's Search (interactive)");

    let term = Term::stdout();
    let secret = prompt(&term, "Enter secret bitstring:")?;
    let mode: ExecutionMode = prompt(&term, "Mode (sampler/estimator):")?.parse()?;

    let pipeline = Pipeline::from_config(args.service.connect().await?, &args.service);
    let report = pipeline.run_grover(&secret, mode).await?;
    print_report(&report);
    Ok(())
}

fn prompt(term: &Term, question: &str) -> std::io::Result<String> {
    term.write_str(&format!("{} ", style(question).bold()))?;
    Ok(term.read_line()?.trim().to_string())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
