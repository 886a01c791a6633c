//! Notification (LED) capability.

/// Canned notification sequences understood by the notification service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotificationSequence {
    /// Start blinking the status LED blue until `BlinkStop`.
    BlinkStartBlue,
    /// Stop any blinking sequence and switch the LED off.
    BlinkStop,
}

pub trait Notifier {
    fn notify(&mut self, sequence: NotificationSequence);
}

/// Status LED on a single GPIO. "Blinking" is rendered as solid on; the
/// pin has no second colour.
#[cfg(feature = "embedded")]
pub struct LedNotifier {
    led: embassy_nrf::gpio::Output<'static>,
}

#[cfg(feature = "embedded")]
impl LedNotifier {
    pub fn new(led: embassy_nrf::gpio::Output<'static>) -> Self {
        Self { led }
    }
}

#[cfg(feature = "embedded")]
impl Notifier for LedNotifier {
    fn notify(&mut self, sequence: NotificationSequence) {
        defmt::debug!("Notification: {}", sequence);
        match sequence {
            // Active-low LED on the DK.
            NotificationSequence::BlinkStartBlue => self.led.set_low(),
            NotificationSequence::BlinkStop => self.led.set_high(),
        }
    }
}
