//! Run challenge-response against the first usable YubiKey
//!
//! Usage: challenge_response <slot 1|2> <challenge>

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;
use yubihid::{ConfigSlot, KeyState, YubiKey};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let slot: u8 = args
        .next()
        .unwrap_or_else(|| "2".to_string())
        .parse()
        .context("slot must be 1 or 2")?;
    let challenge = args.next().unwrap_or_else(|| "yubihid".to_string());

    let slot = ConfigSlot::challenge(slot)?;

    let Some(mut key) = YubiKey::list_connected()?
        .into_iter()
        .find(YubiKey::is_otp_enabled)
    else {
        bail!("No YubiKey with an OTP interface found");
    };

    key.open().await?;
    println!("Using {}", key.info());

    let result = key
        .perform_challenge_response(slot, challenge.as_bytes(), |state| match state {
            KeyState::WaitingForTouch => println!("Touch your YubiKey..."),
            KeyState::Processing => {}
        })
        .await;

    key.close().await?;

    let response = result?;
    println!("{}", hex::encode(response));

    Ok(())
}
