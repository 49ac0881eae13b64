use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl FromStr for GeoPoint {
    type Err = RequestError;

    /// Parse the wire form `"<lat>,<lon>"`. Anything other than exactly two
    /// finite decimal numbers is rejected before the scoring pipeline runs.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || RequestError::InvalidLocation { raw: raw.to_string() };

        let mut parts = raw.split(',');
        let latitude = parts.next().ok_or_else(invalid)?;
        let longitude = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let latitude: f64 = latitude.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = longitude.trim().parse().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }

        Ok(Self { latitude, longitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_comma_separated_pair() {
        let point: GeoPoint = "30.0444, 31.2357".parse().expect("valid location");
        assert_eq!(point, GeoPoint::new(30.0444, 31.2357));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!("30.0444".parse::<GeoPoint>().is_err());
        assert!("30.0,31.2,5.0".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert!("north,east".parse::<GeoPoint>().is_err());
        assert!("30.0,".parse::<GeoPoint>().is_err());
        assert!("NaN,31.2".parse::<GeoPoint>().is_err());
    }
}
