//! GPIO button input with async debouncing.
//!
//! Four physical buttons (active-low with internal pull-up) mapped to the
//! menu keys Up, Down, Ok and Back. Each button runs its own loop that
//! waits for an edge, debounces it and sends the key to the UI channel.

use crate::config::BUTTON_DEBOUNCE_MS;
use crate::ui::InputKey;
use defmt::{debug, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

/// Depth of the key channel between the button loops and the UI loop.
pub const KEY_QUEUE_LEN: usize = 4;

pub type KeySender = Sender<'static, CriticalSectionRawMutex, InputKey, KEY_QUEUE_LEN>;

/// Run a single button loop. One key per press; holding does not repeat.
pub async fn button_task<B>(mut btn: B, key: InputKey, tx: KeySender) -> !
where
    B: Wait + InputPin,
{
    loop {
        if btn.wait_for_falling_edge().await.is_err() {
            warn!("Button {}: edge wait failed", key);
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
            continue;
        }
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low().unwrap_or(false) {
            debug!("Button: {}", key);
            tx.send(key).await;

            let _ = btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
