use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use subscan::summary::print_summary;
use subscan::{run, Args, ScanState};

const BANNER: &str = r#"
           __
   _______/ /_  ______________ _____
  / ___/ / / / __ \/ ___/ ___/ __ `/ __ \
 (__  ) /_/ / /_/ (__  ) /__/ /_/ / / / /
/____/\__,_/_.___/____/\___/\__,_/_/ /_/
"#;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("subscan={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("{}", BANNER);
    println!("    subscan v{} - concurrent subdomain scanner\n", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => on_interrupt.cancel(),
            Err(e) => warn!("cannot listen for interrupts: {}", e),
        }
    });

    if let Err(e) = run(args, cancel).await {
        error!("{}", e);
        println!("[-] Scan error: {}", e);
        print_summary(&ScanState::new());
        return Err(e.into());
    }

    Ok(())
}
