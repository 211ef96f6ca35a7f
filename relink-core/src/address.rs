//! Hardware address type for peripheral identification.
//!
//! A peripheral is identified by a six-octet hardware address entered as
//! hex pairs separated by `:` or `-` (e.g. `F0:F8:F2:DA:37:6F`). Parsing is
//! case-insensitive; the canonical rendering is uppercase with colons.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced when parsing a hardware address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// The input did not contain exactly six octet groups.
    #[error("expected 6 octets, found {found}")]
    WrongOctetCount {
        /// Number of octet groups found in the input.
        found: usize,
    },

    /// An octet group was not a two-digit hex pair.
    #[error("invalid octet {octet:?}")]
    InvalidOctet {
        /// The offending octet group, as written.
        octet: String,
    },
}

/// Canonical six-octet hardware address of a peripheral.
///
/// Immutable once constructed. Accepts colon- or hyphen-separated hex pairs
/// in either case and normalizes on parse, so `f0-f8-f2-da-37-6f` and
/// `F0:F8:F2:DA:37:6F` compare equal.
///
/// # Examples
///
/// ```
/// use relink_core::HardwareAddress;
///
/// let addr: HardwareAddress = "f0:f8:f2:da:37:6f".parse().unwrap();
/// assert_eq!(addr.to_string(), "F0:F8:F2:DA:37:6F");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    /// Create an address from raw octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets of the address.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for HardwareAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(AddressParseError::WrongOctetCount { found: parts.len() });
        }

        let mut octets = [0u8; 6];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(AddressParseError::InvalidOctet {
                    octet: (*part).to_string(),
                });
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| AddressParseError::InvalidOctet {
                octet: (*part).to_string(),
            })?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}
