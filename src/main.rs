use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    arceus::cli::run_cli().await
}
