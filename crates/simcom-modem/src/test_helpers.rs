use std::time::Duration;

use simcom_frame::FrameConfig;
use simcom_transport::MockSerial;

use crate::config::ModemConfig;
use crate::modem::Modem;

/// Timings short enough for the mock, which answers instantly.
pub(crate) fn fast_config() -> ModemConfig {
    ModemConfig {
        frame: FrameConfig {
            initial_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            settle_window: Duration::from_millis(5),
            ..FrameConfig::default()
        },
        default_timeout: Duration::from_millis(500),
        drain_timeout: Duration::from_millis(20),
        ..ModemConfig::default()
    }
}

/// An open, externally powered modem plus a handle on its mock port.
pub(crate) fn open_modem() -> (Modem<MockSerial>, MockSerial) {
    let mock = MockSerial::new();
    let modem = Modem::with_config(mock.clone(), fast_config());
    modem.open().expect("mock open never fails");
    (modem, mock)
}
