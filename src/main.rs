use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let result = nutriwise::run().await;
    nutriwise::logging::flush();
    result
}
