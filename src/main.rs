use clap::{Parser, Subcommand};
use fincalc::api::{Calculator, compute_json, run_http_server};
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fincalc", about = "Canadian personal finance calculators")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the calculators over HTTP.
    Serve {
        #[arg(long, env = "FINCALC_BIND", default_value = "0.0.0.0")]
        bind: IpAddr,
        #[arg(long, env = "FINCALC_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Run one calculator on a JSON payload and print the result.
    Compute {
        #[arg(value_enum)]
        calculator: Calculator,
        /// Payload file, or `-` for stdin. All defaults when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn read_payload(input: Option<PathBuf>) -> Result<String, String> {
    match input {
        None => Ok("{}".to_string()),
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display())),
    }
}

fn compute(calculator: Calculator, input: Option<PathBuf>) -> Result<String, String> {
    let payload = read_payload(input)?;
    let value = compute_json(calculator, &payload).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&value).map_err(|e| format!("Failed to render result: {e}"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fincalc=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { bind, port } => {
            if let Err(e) = run_http_server(SocketAddr::new(bind, port)).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Compute { calculator, input } => match compute(calculator, input) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
    }
}
