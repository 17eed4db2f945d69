use game_client::frameworks::runner;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    runner::run_with_config().await
}
