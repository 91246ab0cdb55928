use std::fmt;

use serde::Serialize;
use simcom_transport::SerialTransport;
use tracing::debug;

use super::ok_request;
use super::signal::SignalQuality;
use crate::error::{ModemError, Result};
use crate::modem::Modem;

/// Phone functionality level (`AT+CFUN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalityLevel {
    Minimum,
    Full,
    DisableRf,
    FactoryTest,
    Reset,
    Offline,
}

impl FunctionalityLevel {
    pub fn code(self) -> u8 {
        match self {
            Self::Minimum => 0,
            Self::Full => 1,
            Self::DisableRf => 4,
            Self::FactoryTest => 5,
            Self::Reset => 6,
            Self::Offline => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Minimum),
            1 => Some(Self::Full),
            4 => Some(Self::DisableRf),
            5 => Some(Self::FactoryTest),
            6 => Some(Self::Reset),
            7 => Some(Self::Offline),
            _ => None,
        }
    }
}

/// What the SIM is waiting for (`AT+CPIN?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStatus {
    Ready,
    SimPin,
    SimPuk,
    PhSimPin,
    SimPin2,
    SimPuk2,
    PhNetPin,
}

impl PinStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::SimPin => "SIM PIN",
            Self::SimPuk => "SIM PUK",
            Self::PhSimPin => "PH-SIM PIN",
            Self::SimPin2 => "SIM PIN2",
            Self::SimPuk2 => "SIM PUK2",
            Self::PhNetPin => "PH-NET PIN",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        [
            Self::Ready,
            Self::SimPin,
            Self::SimPuk,
            Self::PhSimPin,
            Self::SimPin2,
            Self::SimPuk2,
            Self::PhNetPin,
        ]
        .into_iter()
        .find(|status| status.as_str() == value)
    }

    fn needs_puk(self) -> bool {
        matches!(self, Self::SimPuk | Self::SimPuk2)
    }
}

impl fmt::Display for PinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AT commands for status control.
#[derive(Debug)]
pub struct StatusControl<'m, T> {
    modem: &'m Modem<T>,
}

impl<'m, T: SerialTransport> StatusControl<'m, T> {
    pub(crate) fn new(modem: &'m Modem<T>) -> Self {
        Self { modem }
    }

    /// `AT+CFUN?`
    pub fn function(&self) -> Result<FunctionalityLevel> {
        let value = self.query("AT+CFUN?", "+CFUN:")?;
        value
            .parse()
            .ok()
            .and_then(FunctionalityLevel::from_code)
            .ok_or_else(|| ModemError::malformed("AT+CFUN?", value))
    }

    /// `AT+CFUN=<level>[,1]`
    ///
    /// A module in offline mode only accepts offline or reset; anything
    /// else needs a restart first.
    pub fn set_function(&self, level: FunctionalityLevel, reset: bool) -> Result<()> {
        let current = self.function()?;
        if current == FunctionalityLevel::Offline
            && !matches!(level, FunctionalityLevel::Offline | FunctionalityLevel::Reset)
        {
            return Err(ModemError::Usage(
                "reset or restart required to leave offline mode".to_string(),
            ));
        }

        let mut command = format!("AT+CFUN={}", level.code());
        if reset {
            command.push_str(",1");
        }
        self.modem.send_request(&ok_request(command)).map(drop)
    }

    /// `AT+CPIN?`
    pub fn pin_status(&self) -> Result<PinStatus> {
        let value = self.query("AT+CPIN?", "+CPIN:")?;
        PinStatus::parse(&value).ok_or_else(|| ModemError::malformed("AT+CPIN?", value))
    }

    /// `AT+CPIN=<pin>` or `AT+CPIN=<puk>,<pin>`, whichever the SIM asks for.
    pub fn enter_pin(&self, pin: &str, puk: Option<&str>) -> Result<()> {
        let status = self.pin_status()?;
        debug!(%status, "entering PIN");

        let command = match (status, puk) {
            (PinStatus::Ready, _) => {
                return Err(ModemError::Usage("no PIN required".to_string()));
            }
            (status, Some(puk)) if status.needs_puk() => format!("AT+CPIN={puk},{pin}"),
            (status, None) if status.needs_puk() => {
                return Err(ModemError::Usage("PUK required".to_string()));
            }
            _ => format!("AT+CPIN={pin}"),
        };
        self.modem.send_request(&ok_request(command)).map(drop)
    }

    /// `AT+CICCID`: the SIM card's ICCID.
    pub fn iccid(&self) -> Result<String> {
        let value = self.query("AT+CICCID", "+ICCID:")?;
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ModemError::malformed("AT+CICCID", value));
        }
        Ok(value)
    }

    /// `AT+CSQ`
    pub fn signal_quality(&self) -> Result<SignalQuality> {
        let request = ok_request("AT+CSQ").collect("+CSQ:");
        let reply = self.modem.send_request(&request)?;
        let line = reply.information.first().map(String::as_str).unwrap_or_default();
        SignalQuality::parse(line).ok_or_else(|| ModemError::malformed("AT+CSQ", line))
    }

    /// Send `command` and return the value of its `prefix` information line.
    fn query(&self, command: &str, prefix: &str) -> Result<String> {
        let reply = self.modem.send_request(&ok_request(command).collect(prefix))?;
        reply
            .information_value(prefix)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| ModemError::malformed(command, reply.result.clone()))
    }
}
