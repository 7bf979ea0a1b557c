#[tokio::main]
async fn main() -> std::io::Result<()> {
    arena_server::frameworks::server::run_with_config().await
}
