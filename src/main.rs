#[tokio::main]
async fn main() -> anyhow::Result<()> {
    study_notes::run().await
}
