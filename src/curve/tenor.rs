use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tenor label from a forward-points table.
///
/// Either a market bucket (`ON`, `SP`, `1W`, `3M`, ...) or an explicit
/// broken date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenor {
    Overnight,
    TomNext,
    Spot,
    SpotNext,
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    Date(NaiveDate),
}

impl Tenor {
    /// Approximate calendar days from trade date.
    ///
    /// Months count as 30 days and years as 365; spot is T+2.
    pub fn approx_days(&self) -> Option<i64> {
        match *self {
            Tenor::Overnight => Some(1),
            Tenor::TomNext | Tenor::Spot => Some(2),
            Tenor::SpotNext => Some(3),
            Tenor::Days(n) => Some(i64::from(n)),
            Tenor::Weeks(n) => Some(i64::from(n) * 7),
            Tenor::Months(n) => Some(i64::from(n) * 30),
            Tenor::Years(n) => Some(i64::from(n) * 365),
            Tenor::Date(_) => None,
        }
    }

    pub fn is_spot(&self) -> bool {
        matches!(self, Tenor::Spot)
    }
}

impl FromStr for Tenor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        match label.as_str() {
            "ON" | "O/N" => return Ok(Tenor::Overnight),
            "TN" | "T/N" => return Ok(Tenor::TomNext),
            "SP" | "SPOT" => return Ok(Tenor::Spot),
            "SN" | "S/N" => return Ok(Tenor::SpotNext),
            _ => {}
        }

        for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&label, fmt) {
                return Ok(Tenor::Date(date));
            }
        }

        if label.len() < 2 || !label.is_ascii() {
            return Err(s.to_string());
        }
        let (count, unit) = label.split_at(label.len() - 1);
        let n: u32 = count.parse().map_err(|_| s.to_string())?;
        match unit {
            "D" => Ok(Tenor::Days(n)),
            "W" => Ok(Tenor::Weeks(n)),
            "M" => Ok(Tenor::Months(n)),
            "Y" => Ok(Tenor::Years(n)),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Overnight => f.write_str("ON"),
            Tenor::TomNext => f.write_str("TN"),
            Tenor::Spot => f.write_str("SP"),
            Tenor::SpotNext => f.write_str("SN"),
            Tenor::Days(n) => write!(f, "{}D", n),
            Tenor::Weeks(n) => write!(f, "{}W", n),
            Tenor::Months(n) => write!(f, "{}M", n),
            Tenor::Years(n) => write!(f, "{}Y", n),
            Tenor::Date(d) => write!(f, "{}", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_market_labels() {
        assert_eq!("SP".parse::<Tenor>(), Ok(Tenor::Spot));
        assert_eq!("on".parse::<Tenor>(), Ok(Tenor::Overnight));
        assert_eq!("1W".parse::<Tenor>(), Ok(Tenor::Weeks(1)));
        assert_eq!("18M".parse::<Tenor>(), Ok(Tenor::Months(18)));
        assert_eq!("2Y".parse::<Tenor>(), Ok(Tenor::Years(2)));
    }

    #[test]
    fn test_parse_broken_date() {
        assert_eq!(
            "2024-03-15".parse::<Tenor>(),
            Ok(Tenor::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("X".parse::<Tenor>().is_err());
        assert!("3Q".parse::<Tenor>().is_err());
        assert!("".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_approx_days() {
        assert_eq!(Tenor::Spot.approx_days(), Some(2));
        assert_eq!(Tenor::Weeks(2).approx_days(), Some(14));
        assert_eq!(Tenor::Months(3).approx_days(), Some(90));
        assert_eq!(Tenor::Years(1).approx_days(), Some(365));
        assert_eq!(
            Tenor::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).approx_days(),
            None
        );
    }

    #[test]
    fn test_display_round_trip() {
        for label in ["ON", "TN", "SP", "SN", "7D", "1W", "6M", "1Y"] {
            assert_eq!(label.parse::<Tenor>().unwrap().to_string(), label);
        }
    }
}
