use anyhow::Result;

use skinsight::app::serve;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    serve().await
}
