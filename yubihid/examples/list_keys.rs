//! List connected YubiKeys with their serial number and firmware

use tracing_subscriber::EnvFilter;
use yubihid::YubiKey;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let keys = YubiKey::list_connected()?;
    if keys.is_empty() {
        println!("No YubiKey found");
        return Ok(());
    }

    for mut key in keys {
        if !key.is_otp_enabled() {
            println!("{} (no OTP interface, skipped)", key.info());
            continue;
        }

        key.open().await?;

        let status = key.read_status().await?;
        let serial = key.read_serial_number().await?;
        println!("{} serial {} firmware {}", key.info(), serial, status.version);

        key.close().await?;
    }

    Ok(())
}
