use std::cmp::Ordering;

use serde::Serialize;

/// Received signal quality as reported by `AT+CSQ`.
///
/// Codes below 100 are GSM/LTE RSSI readings; 100 and above are TD-SCDMA
/// RSCP readings. The two scales are not comparable, so neither is the
/// ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalQuality {
    /// Signal strength in dBm, `None` when the module cannot tell.
    pub strength_dbm: Option<i16>,
    /// Whether `strength_dbm` is RSCP rather than RSSI.
    pub rscp: bool,
    /// Bit error rate class 0..=7, or 99 when unknown.
    pub bit_error_rate: u8,
}

impl SignalQuality {
    pub const UNKNOWN_BER: u8 = 99;

    /// Decode the two `+CSQ` codes. Returns `None` for codes out of range.
    pub fn from_codes(code: u8, bit_error_rate: u8) -> Option<Self> {
        let (strength_dbm, rscp) = match code {
            0..=31 => (Some(-113 + 2 * i16::from(code)), false),
            32..=98 => (Some(-51), false),
            99 => (None, false),
            100..=191 => (Some(i16::from(code) - 216), true),
            192..=198 => (Some(-26), true),
            199 => (None, true),
            _ => return None,
        };

        if bit_error_rate > 7 && bit_error_rate != Self::UNKNOWN_BER {
            return None;
        }

        Some(Self {
            strength_dbm,
            rscp,
            bit_error_rate,
        })
    }

    /// Parse a `+CSQ: <rssi>,<ber>` line.
    pub fn parse(line: &str) -> Option<Self> {
        let (_, values) = line.split_once("+CSQ:")?;
        let (code, ber) = values.trim().split_once(',')?;
        Self::from_codes(code.trim().parse().ok()?, ber.trim().parse().ok()?)
    }

    /// Strength or bit error rate is unknown.
    pub fn is_unknown(&self) -> bool {
        self.strength_dbm.is_none() || self.bit_error_rate == Self::UNKNOWN_BER
    }

    /// Upper bound of the bit error rate class, as a fraction.
    pub fn max_bit_error_rate(&self) -> f64 {
        match self.bit_error_rate {
            0 => 0.0001,
            1 => 0.001,
            2 => 0.005,
            3 => 0.01,
            4 => 0.02,
            5 => 0.04,
            6 => 0.08,
            _ => 1.0,
        }
    }
}

impl PartialOrd for SignalQuality {
    /// Stronger is greater; equal strengths rank the lower error rate
    /// higher. Unknown readings rank below known ones.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.rscp != other.rscp {
            return None;
        }
        if self == other {
            return Some(Ordering::Equal);
        }

        match (self.is_unknown(), other.is_unknown()) {
            (true, true) => None,
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => Some(
                self.strength_dbm
                    .cmp(&other.strength_dbm)
                    .then_with(|| other.bit_error_rate.cmp(&self.bit_error_rate)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rssi(dbm: i16, ber: u8) -> SignalQuality {
        SignalQuality {
            strength_dbm: Some(dbm),
            rscp: false,
            bit_error_rate: ber,
        }
    }

    #[test]
    fn parses_csq_line() {
        let quality = SignalQuality::parse("+CSQ: 22,0").unwrap();
        assert_eq!(quality, rssi(-69, 0));

        assert_eq!(SignalQuality::parse("+CSQ: 31,7").unwrap(), rssi(-51, 7));
        assert_eq!(SignalQuality::parse("+CSQ: 50,7").unwrap(), rssi(-51, 7));
    }

    #[test]
    fn unknown_codes() {
        let quality = SignalQuality::parse("+CSQ: 99,99").unwrap();
        assert_eq!(quality.strength_dbm, None);
        assert!(!quality.rscp);
        assert!(quality.is_unknown());

        let quality = SignalQuality::parse("+CSQ: 199,99").unwrap();
        assert_eq!(quality.strength_dbm, None);
        assert!(quality.rscp);
    }

    #[test]
    fn rscp_codes() {
        assert_eq!(SignalQuality::from_codes(100, 0).unwrap().strength_dbm, Some(-116));
        assert_eq!(SignalQuality::from_codes(191, 0).unwrap().strength_dbm, Some(-25));
        assert_eq!(SignalQuality::from_codes(195, 0).unwrap().strength_dbm, Some(-26));
        assert!(SignalQuality::from_codes(150, 0).unwrap().rscp);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(SignalQuality::parse("+CSQ: 199,100").is_none());
        assert!(SignalQuality::parse("+CSQ: 255,0").is_none());
        assert!(SignalQuality::parse("+CSQ: 255,100").is_none());
        assert!(SignalQuality::parse("+CSQ: 20,8").is_none());
        assert!(SignalQuality::parse("+CSQ: 20").is_none());
        assert!(SignalQuality::parse("OK").is_none());
    }

    #[test]
    fn ordering_prefers_strength_then_error_rate() {
        assert!(rssi(-51, 6) > rssi(-80, 0));
        assert!(rssi(-51, 0) > rssi(-51, 6));
        assert_eq!(rssi(-51, 6).partial_cmp(&rssi(-51, 6)), Some(Ordering::Equal));
    }

    #[test]
    fn unknown_ranks_lowest() {
        assert!(rssi(-51, 99) < rssi(-113, 7));
        let unknown = SignalQuality::from_codes(99, 0).unwrap();
        assert!(unknown < rssi(-113, 7));
        assert_eq!(unknown.partial_cmp(&rssi(-51, 99)), None);
    }

    #[test]
    fn rssi_and_rscp_are_not_comparable() {
        let rscp = SignalQuality::from_codes(150, 0).unwrap();
        assert_eq!(rscp.partial_cmp(&rssi(-51, 0)), None);
        assert!(!(rscp < rssi(-51, 0)));
        assert!(!(rscp > rssi(-51, 0)));
    }

    #[test]
    fn bit_error_rate_bounds() {
        assert_eq!(rssi(-51, 0).max_bit_error_rate(), 0.0001);
        assert_eq!(rssi(-51, 7).max_bit_error_rate(), 1.0);
        assert_eq!(rssi(-51, 99).max_bit_error_rate(), 1.0);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(rssi(-69, 0)).unwrap();
        assert_eq!(json["strength_dbm"], -69);
        assert_eq!(json["rscp"], false);
        assert_eq!(json["bit_error_rate"], 0);
    }
}
