//! Protocol scenarios against a scripted key

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};
use yubihid::{CancelHandle, ConfigSlot, Error, KeyInfo, KeyState, PollTiming, YubiKey};
use yubihid_core::{checksum, frame::reassemble, report};
use yubihid_transport::{ScriptedTransport, filter_keys, scripted::SentReports};

fn otp_interface() -> KeyInfo {
    KeyInfo::new("scripted", 0x1050, 0x0407, "YubiKey OTP+FIDO+CCID", 0x01, 0x06)
}

async fn open_key(device: ScriptedTransport) -> (YubiKey, SentReports) {
    let sent = device.sent();
    let mut key = YubiKey::new(otp_interface(), device);
    key.open().await.unwrap();
    (key, sent)
}

/// Late-bound cancel handle for script actions
fn deferred_cancel() -> (Arc<OnceLock<CancelHandle>>, impl FnOnce() + Send + Sync + 'static) {
    let slot = Arc::new(OnceLock::<CancelHandle>::new());
    let target = slot.clone();
    let action = move || {
        if let Some(handle) = target.get() {
            handle.cancel();
        }
    };
    (slot, action)
}

fn recorder() -> (Arc<Mutex<Vec<KeyState>>>, impl FnMut(KeyState) + Send) {
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = states.clone();
    (states, move |state| sink.lock().unwrap().push(state))
}

#[tokio::test(start_paused = true)]
async fn serial_number_is_big_endian() {
    let device = ScriptedTransport::new()
        .accept_write(3, 3)
        .response(&[0x00, 0x9A, 0x3B, 0x1C]);
    let (mut key, sent) = open_key(device).await;

    let serial = key.read_serial_number().await.unwrap();

    assert_eq!(serial, 0x009A_3B1C);
    assert_eq!(serial, 10_107_676);

    // Blank request: only the first and last chunk go out, then the reset
    let sent = sent.all();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0][7], 0x80);
    assert_eq!(sent[1][7], 0x89);
    assert_eq!(sent[1][1], 0x10);
    assert_eq!(sent[2], report::reset());
}

#[tokio::test(start_paused = true)]
async fn challenge_response_returns_digest() {
    let digest: [u8; 20] = core::array::from_fn(|i| i as u8 * 7);
    let device = ScriptedTransport::new()
        .accept_write(8, 11)
        .processing()
        .waiting_for_touch()
        .response(&digest);
    let (mut key, sent) = open_key(device).await;
    let (states, observer) = recorder();

    let response = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"abc", observer)
        .await
        .unwrap();

    assert_eq!(response, digest);
    assert_eq!(
        *states.lock().unwrap(),
        vec![KeyState::Processing, KeyState::WaitingForTouch]
    );

    // Padded challenge fills every chunk
    let sent = sent.all();
    assert_eq!(sent.len(), 11);
    let frame = reassemble(&sent[..10]);
    assert_eq!(&frame[..3], b"abc");
    assert!(frame[3..64].iter().all(|&b| b == 61));
    assert_eq!(frame[64], 0x38);
    assert_eq!(
        u16::from_le_bytes([frame[65], frame[66]]),
        checksum::crc16(&frame[..64])
    );
}

#[tokio::test(start_paused = true)]
async fn full_size_challenge_is_not_padded() {
    let challenge = [0xA5u8; 64];
    let device = ScriptedTransport::new()
        .accept_write(1, 11)
        .response(&[0x42; 20]);
    let (mut key, sent) = open_key(device).await;

    key.perform_challenge_response(ConfigSlot::ChallengeHmac1, &challenge, |_| {})
        .await
        .unwrap();

    let frame = reassemble(&sent.all()[..10]);
    assert_eq!(&frame[..64], &challenge[..]);
    assert_eq!(frame[64], 0x30);
}

#[tokio::test(start_paused = true)]
async fn touch_timeout_after_waiting_for_touch() {
    let device = ScriptedTransport::new()
        .accept_write(5, 11)
        .waiting_for_touch()
        .waiting_for_touch()
        .waiting_for_touch()
        .idle(5);
    let (mut key, _) = open_key(device).await;
    let (states, observer) = recorder();

    let start = Instant::now();
    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"hello", observer)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TouchTimeout));
    assert_eq!(start.elapsed(), Duration::from_millis(900));
    assert!(states.lock().unwrap().contains(&KeyState::WaitingForTouch));
}

#[tokio::test(start_paused = true)]
async fn unconfigured_slot() {
    let device = ScriptedTransport::new()
        .accept_write(5, 11)
        .processing()
        .idle(5);
    let (mut key, _) = open_key(device).await;

    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac1, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SlotNotConfigured));
    assert_eq!(err.to_string(), "Slot is not configured.");
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_read_resets_device() {
    let (handle, cancel) = deferred_cancel();
    let device = ScriptedTransport::new()
        .accept_write(5, 11)
        .processing()
        .then(cancel)
        .processing()
        .processing();
    let (mut key, sent) = open_key(device).await;
    handle.set(key.cancel_handle()).unwrap();

    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(sent.last(), Some(report::reset()));
    assert_eq!(sent.len(), 11);
}

#[tokio::test(start_paused = true)]
async fn cancel_from_another_task() {
    let mut device = ScriptedTransport::new().accept_write(5, 11);
    for _ in 0..10 {
        device = device.processing();
    }
    let (mut key, sent) = open_key(device).await;
    let handle = key.cancel_handle();

    tokio::spawn(async move {
        sleep(Duration::from_millis(120)).await;
        handle.cancel();
    });

    let start = Instant::now();
    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(start.elapsed(), Duration::from_millis(150));
    assert_eq!(sent.last(), Some(report::reset()));
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_to_write() {
    let (handle, cancel) = deferred_cancel();
    let device = ScriptedTransport::new()
        .idle(5)
        .write_busy()
        .then(cancel)
        .write_busy()
        .write_busy();
    let (mut key, sent) = open_key(device).await;
    handle.set(key.cancel_handle()).unwrap();

    let err = key.read_serial_number().await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(sent.is_empty());
}

#[tokio::test(start_paused = true)]
async fn device_never_ready() {
    let mut device = ScriptedTransport::new().idle(5);
    for _ in 0..20 {
        device = device.write_busy();
    }
    let (mut key, sent) = open_key(device).await;

    let start = Instant::now();
    let err = key.read_serial_number().await.unwrap_err();

    assert!(matches!(err, Error::ResponseTimeout));
    assert_eq!(start.elapsed(), Duration::from_millis(1000));
    assert!(sent.is_empty());
}

#[tokio::test(start_paused = true)]
async fn corrupt_response_is_communication_failure() {
    let mut device = ScriptedTransport::new().accept_write(5, 11);
    for sequence in 0..4 {
        device = device.pending(&[0x11; 7], sequence);
    }
    let device = device.pending(&[], 0);
    let (mut key, _) = open_key(device).await;

    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CommunicationFailure(_)));
    assert!(err.is_communication_failure());
}

#[tokio::test(start_paused = true)]
async fn unplugged_mid_read() {
    let device = ScriptedTransport::new()
        .accept_write(5, 11)
        .processing()
        .failure("device disconnected");
    let (mut key, _) = open_key(device).await;

    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac2, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(err.is_communication_failure());
}

#[tokio::test]
async fn serial_slot_rejected_for_challenge() {
    let (mut key, sent) = open_key(ScriptedTransport::new()).await;

    let err = key
        .perform_challenge_response(ConfigSlot::DeviceSerial, b"hello", |_| {})
        .await
        .unwrap_err();

    assert!(err.is_usage_error());
    assert!(sent.is_empty());
}

#[tokio::test]
async fn oversized_challenge_rejected() {
    let (mut key, sent) = open_key(ScriptedTransport::new()).await;

    let err = key
        .perform_challenge_response(ConfigSlot::ChallengeHmac1, &[0u8; 65], |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Core(yubihid_core::Error::PayloadTooLarge { size: 65, max: 64 })
    ));
    assert!(sent.is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_timing_shortens_touch_polling() {
    let device = ScriptedTransport::new()
        .accept_write(5, 11)
        .waiting_for_touch()
        .response(&[0x42; 20]);
    let sent = device.sent();
    let timing = PollTiming {
        touch_interval: Duration::from_millis(10),
        ..PollTiming::default()
    };
    let mut key = YubiKey::new(otp_interface(), device).with_timing(timing);
    key.open().await.unwrap();

    let start = Instant::now();
    key.perform_challenge_response(ConfigSlot::ChallengeHmac1, b"x", |_| {})
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(10));
    assert_eq!(sent.last(), Some(report::reset()));
}

#[tokio::test]
async fn firmware_status() {
    let (mut key, _) = open_key(ScriptedTransport::new().idle(17)).await;

    let status = key.read_status().await.unwrap();

    assert_eq!(status.version.to_string(), "5.4.3");
    assert_eq!(status.config_sequence, 17);
    assert_eq!(status.config_status(), 0x1F);
}

#[tokio::test]
async fn open_close_lifecycle() {
    let mut key = YubiKey::new(otp_interface(), ScriptedTransport::new());
    assert!(!key.is_open());

    key.open().await.unwrap();
    assert!(key.is_open());
    assert!(key.open().await.unwrap_err().is_usage_error());

    key.close().await.unwrap();
    assert!(!key.is_open());
    assert!(key.close().await.unwrap_err().is_usage_error());
}

#[tokio::test]
async fn refused_open_leaves_key_closed() {
    let mut key = YubiKey::new(otp_interface(), ScriptedTransport::new().failing_open());

    let err = key.open().await.unwrap_err();

    assert!(err.is_communication_failure());
    assert!(!key.is_open());
    assert!(matches!(
        key.read_serial_number().await,
        Err(Error::Core(yubihid_core::Error::SessionNotOpen))
    ));
}

#[test]
fn discovery_flags_non_otp_interfaces() {
    let found = filter_keys(vec![
        otp_interface(),
        KeyInfo::new("fido", 0x1050, 0x0407, "YubiKey OTP+FIDO+CCID", 0xF1D0, 0x01),
    ]);

    let keys: Vec<YubiKey> = found
        .into_iter()
        .map(|info| YubiKey::new(info, ScriptedTransport::new()))
        .collect();

    assert_eq!(keys.len(), 2);
    assert!(keys[0].is_otp_enabled());
    assert!(!keys[1].is_otp_enabled());
    assert_eq!(
        keys[0].info().to_string(),
        "YubiKey OTP+FIDO+CCID [PID: 0407, HID usage: (1, 6)]"
    );
}
