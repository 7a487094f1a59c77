#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stackdriver::app::main().await
}
