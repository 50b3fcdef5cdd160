#[tokio::main]
async fn main() {
    if let Err(e) = smtp2go_usage::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
