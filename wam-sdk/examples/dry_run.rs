//! Discover speakers and show what a command would send, without a real transport
//!
//! Usage: cargo run -p wam-sdk --example dry_run -- [command] [value]
//!
//! Set `WAM_LOG_MODE=development` to see discovery and registry logs.

use std::net::IpAddr;

use async_trait::async_trait;
use wam_sdk::logging::init_logging_from_env;
use wam_sdk::{Ack, ApiCall, ApiError, DeviceClient, DispatchMode, PropertyMap, SystemConfig, WamSystem};

/// Prints every call instead of sending it
struct PrintingClient;

#[async_trait]
impl DeviceClient for PrintingClient {
    type Handle = IpAddr;

    async fn connect(&self, ip: IpAddr, port: u16) -> Result<IpAddr, ApiError> {
        println!("connect {}:{}", ip, port);
        Ok(ip)
    }

    async fn disconnect(&self, handle: &IpAddr) -> Result<(), ApiError> {
        println!("disconnect {}", handle);
        Ok(())
    }

    async fn send_command(&self, handle: &IpAddr, call: &ApiCall) -> Result<Ack, ApiError> {
        let json = serde_json::to_string(call).map_err(|e| ApiError::ProtocolError(e.to_string()))?;
        println!("{} <- {}", handle, json);
        Ok(Ack::new(call.method.clone()))
    }

    async fn fetch_state(&self, _handle: &IpAddr) -> Result<PropertyMap, ApiError> {
        Ok(PropertyMap::new())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "play".to_string());
    let value = args.next();

    let system = WamSystem::with_config(PrintingClient, SystemConfig::responsive())?;
    let devices = system.discover().await?;
    if devices.is_empty() {
        println!("No speakers found");
        return Ok(());
    }

    for device in &devices {
        system.connect_discovered(device).await?;
    }

    for summary in system.list_devices() {
        let target = summary.ip.to_string();
        if let Err(e) = system
            .dispatch_command(&target, &command, value.as_deref(), DispatchMode::Individual)
            .await
        {
            eprintln!("{}: {}", target, e);
        }
    }

    system.disconnect_all().await;
    Ok(())
}
