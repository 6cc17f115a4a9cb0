use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "OPENLEARN_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = openlearn::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
