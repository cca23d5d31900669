/// Denominations and micro-unit scaling.
///
/// Cosmos amounts are integers in minor units (1 token = 1_000_000 minor
/// units for every denom this tool reports on).

use serde::Serialize;

use crate::chains::IbcDenoms;

pub const MICRO_UNITS_PER_TOKEN: u128 = 1_000_000;

pub fn scale_micro(minor_units: u128) -> f64 {
    minor_units as f64 / MICRO_UNITS_PER_TOKEN as f64
}

/// Format minor units as whole tokens with 6 decimals.
///
/// # Examples
/// ```
/// use alliance_observatory::denom::format_micro_amount;
/// assert_eq!(format_micro_amount(1_500_000), "1.500000");
/// assert_eq!(format_micro_amount(7), "0.000007");
/// ```
pub fn format_micro_amount(minor_units: u128) -> String {
    let whole = minor_units / MICRO_UNITS_PER_TOKEN;
    let frac = minor_units % MICRO_UNITS_PER_TOKEN;
    format!("{}.{:06}", whole, frac)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Denom {
    /// `ibc/<hash>` voucher, hash kept without the `ibc/` prefix
    Ibc(String),
    /// `u<base>` micro-unit native denom, kept without the leading `u`
    Micro(String),
    Other(String),
}

impl Denom {
    pub fn parse(raw: &str) -> Option<Denom> {
        let raw = raw.trim();
        if let Some(hash) = raw.strip_prefix("ibc/") {
            return (!hash.is_empty()).then(|| Denom::Ibc(hash.to_string()));
        }
        match raw.strip_prefix('u') {
            Some(base) if !base.is_empty() => Some(Denom::Micro(base.to_string())),
            _ if !raw.is_empty() => Some(Denom::Other(raw.to_string())),
            _ => None,
        }
    }

    /// Name shown in reports and used as series key.
    pub fn canonical(&self, ibc: &IbcDenoms) -> String {
        match self {
            Denom::Ibc(hash) => ibc.normalize(hash),
            Denom::Micro(base) => base.clone(),
            Denom::Other(raw) => raw.clone(),
        }
    }
}
