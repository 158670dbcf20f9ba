//! Data-to-pixel mapping for panel axes.

use crate::error::{Error, Result};

/// Linear scale for continuous-to-continuous mapping.
///
/// The range may be inverted (`range.0 > range.1`), which is how the y axis
/// maps larger values to smaller pixel rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain(format!("non-finite domain {domain:?}")));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Map a domain value into the range. Values outside the domain extrapolate.
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    /// Whether `value` lies inside the domain, inclusive.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = if self.domain_min <= self.domain_max {
            (self.domain_min, self.domain_max)
        } else {
            (self.domain_max, self.domain_min)
        };
        (lo..=hi).contains(&value)
    }
}
