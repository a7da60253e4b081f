//! NAT subnet capacity and utilization.
//!
//! Every figure here is derived from a subnet's CIDR string and the owning
//! attachment's forwarding rule count, nothing else.

use super::cidr::{Cidr, CidrError};
use std::fmt;

/// Addresses withheld from every NAT subnet for infrastructure use.
pub const RESERVED_IPS: u128 = 4;

/// Rendering of a value that could not be resolved.
pub const UNAVAILABLE: &str = "N/A";

/// A value that is either known or could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure<T> {
    Resolved(T),
    Unavailable,
}

impl<T> Measure<T> {
    pub fn as_ref(&self) -> Measure<&T> {
        match self {
            Measure::Resolved(v) => Measure::Resolved(v),
            Measure::Unavailable => Measure::Unavailable,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Measure<U> {
        match self {
            Measure::Resolved(v) => Measure::Resolved(f(v)),
            Measure::Unavailable => Measure::Unavailable,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Measure::Unavailable)
    }
}

impl<T: fmt::Display> fmt::Display for Measure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Resolved(v) => fmt::Display::fmt(v, f),
            Measure::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Render a percentage with two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}", value)
}

/// Addresses left once connected forwarding rules and the reservation are taken.
pub fn available_ips(ip_count: u128, rule_count: u64) -> u128 {
    ip_count
        .saturating_sub(u128::from(rule_count))
        .saturating_sub(RESERVED_IPS)
}

/// Share of the range in use, 0-100. An empty range counts as 0.
pub fn utilization_percent(ip_count: u128, available: u128) -> f64 {
    if ip_count == 0 {
        return 0.0;
    }
    (1.0 - (available as f64 / ip_count as f64)) * 100.0
}

/// Capacity figures of one resolved NAT subnet.
#[derive(Debug, Clone, PartialEq)]
pub struct SubnetCapacity {
    /// The range exactly as the API reported it
    pub range: String,
    pub ip_count: u128,
    pub reserved_ips: u128,
    pub available: u128,
    pub utilization: f64,
}

impl SubnetCapacity {
    /// Parse `cidr_range` and compute capacity for `rule_count` connected rules.
    pub fn compute(cidr_range: &str, rule_count: u64) -> Result<Self, CidrError> {
        let ip_count = Cidr::parse(cidr_range)?.address_count();
        let available = available_ips(ip_count, rule_count);
        Ok(Self {
            range: cidr_range.to_string(),
            ip_count,
            reserved_ips: RESERVED_IPS,
            available,
            utilization: utilization_percent(ip_count, available),
        })
    }
}

/// One NAT subnet of an attachment, resolved or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SubnetUsage {
    pub name: String,
    pub capacity: Measure<SubnetCapacity>,
}

impl SubnetUsage {
    pub fn resolved(name: impl Into<String>, capacity: SubnetCapacity) -> Self {
        Self {
            name: name.into(),
            capacity: Measure::Resolved(capacity),
        }
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: Measure::Unavailable,
        }
    }

    /// Utilization, with an unresolved subnet counting as 0.
    pub fn utilization(&self) -> f64 {
        match &self.capacity {
            Measure::Resolved(c) => c.utilization,
            Measure::Unavailable => 0.0,
        }
    }

    pub fn range(&self) -> Measure<String> {
        self.capacity.as_ref().map(|c| c.range.clone())
    }

    pub fn ip_count(&self) -> Measure<u128> {
        self.capacity.as_ref().map(|c| c.ip_count)
    }

    pub fn available(&self) -> Measure<u128> {
        self.capacity.as_ref().map(|c| c.available)
    }
}

/// Mean utilization over all subnets of an attachment.
///
/// Unresolved subnets are included as 0, which pulls the average down when
/// lookups fail. With no subnets at all the average is unavailable.
pub fn average_utilization(subnets: &[SubnetUsage]) -> Measure<f64> {
    if subnets.is_empty() {
        return Measure::Unavailable;
    }
    let total: f64 = subnets.iter().map(SubnetUsage::utilization).sum();
    Measure::Resolved(total / subnets.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_28_with_two_rules() {
        let c = SubnetCapacity::compute("10.0.0.0/28", 2).unwrap();
        assert_eq!(c.ip_count, 16);
        assert_eq!(c.reserved_ips, 4);
        assert_eq!(c.available, 10);
        assert_eq!(c.utilization, 37.5);
        assert_eq!(format_percent(c.utilization), "37.50");
    }

    #[test]
    fn test_slash_30_over_subscribed_clamps_to_zero() {
        let c = SubnetCapacity::compute("10.0.0.0/30", 5).unwrap();
        assert_eq!(c.ip_count, 4);
        assert_eq!(c.available, 0);
        assert_eq!(format_percent(c.utilization), "100.00");
    }

    #[test]
    fn test_single_rule_on_slash_24() {
        let c = SubnetCapacity::compute("192.168.0.0/24", 1).unwrap();
        assert_eq!(c.available, 251);
        assert_eq!(format_percent(c.utilization), "1.95");
    }

    #[test]
    fn test_zero_ip_count_is_zero_utilization() {
        assert_eq!(utilization_percent(0, 0), 0.0);
        assert_eq!(available_ips(0, 3), 0);
    }

    #[test]
    fn test_invalid_range_is_error() {
        assert!(SubnetCapacity::compute("N/A", 1).is_err());
        assert!(SubnetCapacity::compute("10.0.0.5/28", 1).is_err());
    }

    #[test]
    fn test_range_cell_keeps_api_text() {
        let usage = SubnetUsage::resolved(
            "nat-v6",
            SubnetCapacity::compute("fd00:0:0:0::/120", 0).unwrap(),
        );
        assert_eq!(usage.range().to_string(), "fd00:0:0:0::/120");
        assert_eq!(usage.ip_count().to_string(), "256");
    }

    #[test]
    fn test_average_includes_failed_subnets_as_zero() {
        let subnets = vec![
            SubnetUsage::resolved("a", SubnetCapacity::compute("10.0.0.0/28", 2).unwrap()),
            SubnetUsage::unavailable("b"),
        ];
        assert_eq!(average_utilization(&subnets), Measure::Resolved(18.75));
    }

    #[test]
    fn test_average_of_no_subnets_is_unavailable() {
        let avg = average_utilization(&[]);
        assert!(avg.is_unavailable());
        assert_eq!(avg.to_string(), "N/A");
    }

    #[test]
    fn test_unavailable_subnet_renders_sentinel() {
        let usage = SubnetUsage::unavailable("nat-x");
        assert_eq!(usage.range().to_string(), "N/A");
        assert_eq!(usage.ip_count().to_string(), "N/A");
        assert_eq!(usage.available().to_string(), "N/A");
        assert_eq!(usage.utilization(), 0.0);
    }
}
