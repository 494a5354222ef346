//! Descriptive statistics over cost samples.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

/// Round to a fixed number of decimal places.
///
/// Rounds the exact binary value with ties to even, so `0.125` becomes `0.12`
/// and `1.115` (stored just below) becomes `1.11`.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// `numerator / denominator`, or 0 when there is nothing to divide by.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of the samples. A single sample is returned as-is.
pub fn median(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        1 => values[0],
        n => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            if n % 2 == 1 {
                sorted[n / 2]
            } else {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            }
        }
    }
}

/// Sample standard deviation; 0 below two samples.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Reported statistics for a non-empty list of costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostStats {
    pub count: usize,
    pub total: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub stdev: f64,
}

impl CostStats {
    /// Compute rounded statistics, or `None` for an empty list.
    ///
    /// A lone sample's median is reported unrounded.
    pub fn from_costs(costs: &[f64]) -> Option<Self> {
        if costs.is_empty() {
            return None;
        }
        let min = costs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let median = if costs.len() > 1 {
            round_to(median(costs), 2)
        } else {
            costs[0]
        };

        Some(Self {
            count: costs.len(),
            total: round_to(costs.iter().sum(), 2),
            avg: round_to(mean(costs), 2),
            min: round_to(min, 2),
            max: round_to(max, 2),
            median,
            stdev: round_to(sample_stdev(costs), 2),
        })
    }
}

/// String-keyed groups that remember first-encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedGroups<T> {
    index: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T> OrderedGroups<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Get the group for `key`, creating it with `T::default()` on first use.
    pub fn entry(&mut self, key: &str) -> &mut T
    where
        T: Default,
    {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transform every group, keeping order; groups mapped to `None` are dropped.
    pub fn filter_map<U>(self, mut f: impl FnMut(&str, T) -> Option<U>) -> OrderedGroups<U> {
        let mut out = OrderedGroups::new();
        for (key, value) in self.entries {
            if let Some(mapped) = f(&key, value) {
                out.index.insert(key.clone(), out.entries.len());
                out.entries.push((key, mapped));
            }
        }
        out
    }
}

impl<T> Default for OrderedGroups<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for OrderedGroups<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
        assert_eq!(round_to(2.345678, 1), 2.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }

    #[test]
    fn test_round_to_ties_and_binary_values() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(1.115, 2), 1.11);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.35, 1), 0.3);
        assert_eq!(round_to(-0.125, 2), -0.12);
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
    }

    #[test]
    fn test_median_single_value_is_that_value() {
        assert_eq!(median(&[0.123456]), 0.123456);
        let stats = CostStats::from_costs(&[0.123456]).unwrap();
        assert_eq!(stats.median, 0.123456);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_stdev_below_two_samples_is_zero() {
        assert_eq!(sample_stdev(&[]), 0.0);
        assert_eq!(sample_stdev(&[5.0]), 0.0);
        assert_eq!(CostStats::from_costs(&[5.0]).unwrap().stdev, 0.0);
    }

    #[test]
    fn test_sample_stdev() {
        // Sample variance of [2, 4, 4, 4, 5, 5, 7, 9] is 32 / 7.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_stdev(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cost_stats_rounding() {
        let stats = CostStats::from_costs(&[0.111, 0.222, 0.333]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, 0.67);
        assert_eq!(stats.avg, 0.22);
        assert_eq!(stats.min, 0.11);
        assert_eq!(stats.max, 0.33);
        assert_eq!(stats.median, 0.22);
        assert_eq!(stats.stdev, 0.11);
    }

    #[test]
    fn test_cost_stats_empty() {
        assert!(CostStats::from_costs(&[]).is_none());
    }

    #[test]
    fn test_ordered_groups_keep_first_encounter_order() {
        let mut groups: OrderedGroups<u32> = OrderedGroups::new();
        *groups.entry("b") += 1;
        *groups.entry("a") += 1;
        *groups.entry("b") += 1;

        let keys: Vec<_> = groups.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(groups.get("b"), Some(&2));

        let json = serde_json::to_string(&groups).unwrap();
        assert_eq!(json, r#"{"b":2,"a":1}"#);
    }

    #[test]
    fn test_ordered_groups_filter_map() {
        let mut groups: OrderedGroups<u32> = OrderedGroups::new();
        *groups.entry("x") += 0;
        *groups.entry("y") += 3;
        let kept = groups.filter_map(|_, v| (v > 0).then_some(v * 2));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.get("y"), Some(&6));
        assert!(kept.get("x").is_none());
    }
}
