#[tokio::main]
async fn main() -> anyhow::Result<()> {
    recall_backend::run().await
}
