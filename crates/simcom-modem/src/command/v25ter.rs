use serde::Serialize;
use simcom_transport::SerialTransport;

use super::{ok_request, ERROR_MARKER};
use crate::error::{ModemError, Result};
use crate::modem::Modem;
use crate::request::{CommandRequest, Reply};

const IDENTIFY_FIELDS: [&str; 5] = ["Manufacturer:", "Model:", "Revision:", "IMEI:", "+GCAP:"];
const CALL_FAILURES: [&str; 5] = [ERROR_MARKER, "NO CARRIER", "BUSY", "NO ANSWER", "NO DIALTONE"];

/// Product identification returned by `ATI`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identification {
    pub manufacturer: String,
    pub model: String,
    pub revision: String,
    pub imei: String,
    /// `+GCAP` entries without their leading `+`.
    pub capabilities: Vec<String>,
}

impl Identification {
    /// Build from the information lines of an `ATI` reply.
    ///
    /// Manufacturer, model, revision and a numeric IMEI are required.
    pub fn from_reply(reply: &Reply) -> Option<Self> {
        let imei = reply.information_value("IMEI:")?;
        if imei.is_empty() || !imei.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let capabilities = reply
            .information_value("+GCAP:")
            .map(|caps| {
                caps.split(',')
                    .map(|cap| cap.trim().trim_start_matches('+').to_string())
                    .filter(|cap| !cap.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            manufacturer: reply.information_value("Manufacturer:")?.to_string(),
            model: reply.information_value("Model:")?.to_string(),
            revision: reply.information_value("Revision:")?.to_string(),
            imei: imei.to_string(),
            capabilities,
        })
    }
}

/// Voice or data call, chosen when dialing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallKind {
    #[default]
    Voice,
    Data,
}

/// Modifiers for [`V25ter::dial`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialOptions {
    pub kind: CallKind,
    /// Restrict presentation of the caller's number (`I`).
    pub hide_caller_id: bool,
    /// Invoke the closed user group (`G`).
    pub closed_user_group: bool,
}

impl DialOptions {
    fn command(&self, number: &str) -> String {
        let mut command = format!("ATD{number}");
        if self.hide_caller_id {
            command.push('I');
        }
        if self.closed_user_group {
            command.push('G');
        }
        if self.kind == CallKind::Voice {
            command.push(';');
        }
        command
    }

    fn success_marker(&self) -> &'static str {
        match self.kind {
            CallKind::Voice => "OK",
            CallKind::Data => "CONNECT",
        }
    }
}

/// AT commands according to V.25TER.
#[derive(Debug)]
pub struct V25ter<'m, T> {
    modem: &'m Modem<T>,
}

impl<'m, T: SerialTransport> V25ter<'m, T> {
    pub(crate) fn new(modem: &'m Modem<T>) -> Self {
        Self { modem }
    }

    /// `AT`: check that the module answers.
    pub fn attention(&self) -> Result<()> {
        self.modem.send_request(&ok_request("AT")).map(drop)
    }

    /// `ATI`: product identification.
    pub fn identify(&self) -> Result<Identification> {
        let mut request = ok_request("ATI");
        for field in IDENTIFY_FIELDS {
            request = request.collect(field);
        }

        let reply = self.modem.send_request(&request)?;
        Identification::from_reply(&reply)
            .ok_or_else(|| ModemError::malformed("ATI", reply.information.join("\n")))
    }

    /// `ATE0` / `ATE1`: command echo.
    pub fn set_echo(&self, enabled: bool) -> Result<()> {
        let command = if enabled { "ATE1" } else { "ATE0" };
        self.modem.send_request(&ok_request(command)).map(drop)
    }

    /// `A/`: repeat the previous command and return the first reply frame.
    pub fn re_issue(&self) -> Result<String> {
        let request = CommandRequest::new("A/").error(ERROR_MARKER);
        self.modem.send_request(&request).map(|reply| reply.result)
    }

    /// `ATD`: originate a call to `number`.
    ///
    /// Voice calls complete on `OK`, data calls on `CONNECT`.
    pub fn dial(&self, number: &str, options: DialOptions) -> Result<()> {
        if !is_dial_string(number) {
            return Err(ModemError::Usage(format!("invalid dial string {number:?}")));
        }

        let request = CommandRequest::new(options.command(number))
            .expect(options.success_marker())
            .errors(CALL_FAILURES);
        self.modem.send_request(&request).map(drop)
    }

    /// `ATA`: answer an incoming call.
    pub fn answer(&self) -> Result<()> {
        let request = ok_request("ATA").error("NO CARRIER");
        self.modem.send_request(&request).map(drop)
    }

    /// `ATH`: disconnect the current call.
    pub fn hang_up(&self) -> Result<()> {
        self.modem.send_request(&ok_request("ATH")).map(drop)
    }
}

fn is_dial_string(number: &str) -> bool {
    !number.is_empty()
        && number
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#' | 'A'..='D' | 'P' | 'W' | ','))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::open_modem;

    const ATI_RESPONSE: &[u8] = b"\r\nManufacturer: SIMCOM INCORPORATED\r\n\
Model: SIMCOM_SIM7600E-H\r\nRevision: SIM7600M22_V1.1\r\n\
IMEI: 861234567890123\r\n+GCAP: +CGSM,+FCLASS,+DS\r\n\r\nOK\r\n";

    #[test]
    fn identify_parses_ati() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATI\r", ATI_RESPONSE);

        let id = modem.v25ter().identify().unwrap();
        assert_eq!(id.manufacturer, "SIMCOM INCORPORATED");
        assert_eq!(id.model, "SIMCOM_SIM7600E-H");
        assert_eq!(id.revision, "SIM7600M22_V1.1");
        assert_eq!(id.imei, "861234567890123");
        assert_eq!(id.capabilities, vec!["CGSM", "FCLASS", "DS"]);
        assert!(modem.unsolicited().is_empty());
    }

    #[test]
    fn identify_without_imei_is_malformed() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATI\r", b"\r\nManufacturer: SIMCOM INCORPORATED\r\nOK\r\n");

        let err = modem.v25ter().identify().unwrap_err();
        assert!(matches!(err, ModemError::MalformedResponse { ref command, .. } if command == "ATI"));
    }

    #[test]
    fn attention_and_echo() {
        let (modem, mock) = open_modem();
        mock.add_response(b"AT\r", b"\r\nOK\r\n");
        mock.add_response(b"ATE0\r", b"\r\nOK\r\n");

        modem.v25ter().attention().unwrap();
        modem.v25ter().set_echo(false).unwrap();
        assert_eq!(mock.written(), vec![b"AT\r".to_vec(), b"ATE0\r".to_vec()]);
    }

    #[test]
    fn re_issue_returns_first_frame() {
        let (modem, mock) = open_modem();
        mock.add_response(b"A/\r", b"\r\n+CSQ: 22,0\r\n\r\nOK\r\n");

        assert_eq!(modem.v25ter().re_issue().unwrap(), "+CSQ: 22,0");
        assert_eq!(modem.unsolicited().snapshot(), vec!["OK"]);
    }

    #[test]
    fn dial_voice_appends_semicolon() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATD10086I;\r", b"\r\nOK\r\n");

        let options = DialOptions {
            hide_caller_id: true,
            ..DialOptions::default()
        };
        modem.v25ter().dial("10086", options).unwrap();
    }

    #[test]
    fn dial_data_waits_for_connect() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATD*99#\r", b"\r\nCONNECT 150000000\r\n");

        let options = DialOptions {
            kind: CallKind::Data,
            ..DialOptions::default()
        };
        modem.v25ter().dial("*99#", options).unwrap();
    }

    #[test]
    fn dial_busy_is_rejected() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATD10086;\r", b"\r\nBUSY\r\n");

        let err = modem.v25ter().dial("10086", DialOptions::default()).unwrap_err();
        assert!(matches!(err, ModemError::CommandRejected { ref marker, .. } if marker == "BUSY"));
    }

    #[test]
    fn dial_rejects_bad_number_without_writing() {
        let (modem, mock) = open_modem();

        let err = modem.v25ter().dial("10086;ATH", DialOptions::default()).unwrap_err();
        assert!(matches!(err, ModemError::Usage(_)));
        assert!(mock.written().is_empty());
    }

    #[test]
    fn answer_without_call_is_rejected() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATA\r", b"\r\nNO CARRIER\r\n");

        let err = modem.v25ter().answer().unwrap_err();
        assert!(matches!(err, ModemError::CommandRejected { ref marker, .. } if marker == "NO CARRIER"));
    }

    #[test]
    fn hang_up_sends_ath() {
        let (modem, mock) = open_modem();
        mock.add_response(b"ATH\r", b"\r\nOK\r\n");

        modem.v25ter().hang_up().unwrap();
        assert_eq!(mock.written(), vec![b"ATH\r".to_vec()]);
    }
}
