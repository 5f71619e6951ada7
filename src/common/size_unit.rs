// SizeUnit
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::Error;
use std::fmt;
use std::str::FromStr;

// Decimal multiplier between two adjacent tiers.
const TIER_MULTIPLIER: f64 = 1000.0;

/// `SizeUnit` represents how we want the bucket sizes to be displayed.
///
/// Each unit is a tier on a decimal scale, the tier is both the power of 1000
/// the byte count is divided by and the number of decimal places the result
/// is rounded to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SizeUnit {
    /// Plain byte count, tier 0.
    #[default]
    Byte,

    /// Kilobytes (1000 bytes), tier 1.
    Kilobyte,

    /// Megabytes, tier 2.
    Megabyte,

    /// Gigabytes, tier 3.
    Gigabyte,

    /// Terabytes, tier 4.
    Terabyte,
}

impl SizeUnit {
    /// Every unit, in tier order.
    pub const ALL: [Self; 5] = [
        Self::Byte,
        Self::Kilobyte,
        Self::Megabyte,
        Self::Gigabyte,
        Self::Terabyte,
    ];

    /// Ordinal position of the unit on the scale.
    pub const fn tier(self) -> u8 {
        match self {
            Self::Byte     => 0,
            Self::Kilobyte => 1,
            Self::Megabyte => 2,
            Self::Gigabyte => 3,
            Self::Terabyte => 4,
        }
    }

    /// Short label used in column headers, e.g. `size (kb)`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Byte     => "byte",
            Self::Kilobyte => "kb",
            Self::Megabyte => "mb",
            Self::Gigabyte => "gb",
            Self::Terabyte => "tb",
        }
    }

    /// Scale `bytes` to this unit, rounded to `tier` decimal places.
    ///
    /// Ties round to the even digit, so 1250 bytes is 1.2 kb.
    pub fn convert(self, bytes: u64) -> f64 {
        let tier    = i32::from(self.tier());
        let scaled  = bytes as f64 / TIER_MULTIPLIER.powi(tier);
        let rounder = 10_f64.powi(tier);

        (scaled * rounder).round_ties_even() / rounder
    }

    /// Display form of `bytes` in this unit.
    ///
    /// Byte counts are printed from the integer, so they stay exact past
    /// the range `f64` can hold.
    pub fn display(self, bytes: u64) -> String {
        match self {
            Self::Byte => bytes.to_string(),
            _          => self.convert(bytes).to_string(),
        }
    }
}

/// This converts from the string arguments we receive on the command line to
/// our enum type.
impl FromStr for SizeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "byte" | "bytes" => Ok(Self::Byte),
            "kb"                   => Ok(Self::Kilobyte),
            "mb"                   => Ok(Self::Megabyte),
            "gb"                   => Ok(Self::Gigabyte),
            "tb"                   => Ok(Self::Terabyte),
            _                      => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
