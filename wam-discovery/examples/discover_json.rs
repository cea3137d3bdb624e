//! Speaker discovery that prints JSON for scripting
//!
//! Usage: cargo run -p wam-sdk-discovery --example discover_json [seconds]

use std::time::Duration;

use wam_discovery::get_with_timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    let devices = get_with_timeout(Duration::from_secs(timeout)).await?;
    println!("{}", serde_json::to_string_pretty(&devices)?);
    Ok(())
}
