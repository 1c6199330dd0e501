//! Mobile-money carrier detection for Ghanaian phone numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported mobile-money carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Mtn,
    AirtelTigo,
    Telecel,
}

/// Carrier prefix table, matched against the first three digits.
const NETWORK_PREFIXES: [(Network, &[&str]); 3] = [
    (Network::Mtn, &["024", "054", "055", "059", "025"]),
    (Network::AirtelTigo, &["026", "027", "056", "057"]),
    (Network::Telecel, &["020", "050"]),
];

/// Display attributes for a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub name: &'static str,
    pub short_name: &'static str,
    pub color: &'static str,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mtn, Network::AirtelTigo, Network::Telecel];

    pub fn prefixes(self) -> &'static [&'static str] {
        NETWORK_PREFIXES
            .iter()
            .find(|(network, _)| *network == self)
            .map(|(_, prefixes)| *prefixes)
            .unwrap_or(&[])
    }

    pub fn info(self) -> NetworkInfo {
        match self {
            Network::Mtn => NetworkInfo {
                name: "MTN Mobile Money",
                short_name: "MTN MoMo",
                color: "#FFCC00",
            },
            Network::AirtelTigo => NetworkInfo {
                name: "AirtelTigo Money",
                short_name: "AirtelTigo",
                color: "#E40000",
            },
            Network::Telecel => NetworkInfo {
                name: "Telecel Cash",
                short_name: "Telecel",
                color: "#E60000",
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Network::Mtn => "MTN",
            Network::AirtelTigo => "AirtelTigo",
            Network::Telecel => "Telecel",
        };
        f.write_str(label)
    }
}

/// Keeps only the ASCII digits of `raw`.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Classifies a phone number by its first three digits.
///
/// Non-digits are stripped first. Returns `None` for fewer than three digits
/// or an unknown prefix.
pub fn detect_network(raw: &str) -> Option<Network> {
    let cleaned = digits(raw);
    let prefix = cleaned.get(..3)?;

    NETWORK_PREFIXES
        .iter()
        .find(|(_, prefixes)| prefixes.iter().any(|p| *p == prefix))
        .map(|(network, _)| *network)
}

/// Renders `0241234567` as `024 123 4567`. Shorter input is returned as is.
pub fn format_phone_number(raw: &str) -> String {
    let cleaned = digits(raw);
    if cleaned.len() >= 10 {
        format!("{} {} {}", &cleaned[..3], &cleaned[3..6], &cleaned[6..10])
    } else {
        raw.to_string()
    }
}
