//! Weighted samples and transitions, as produced by the list parsers.

use crate::value::Value;

/// A value with a sampling weight. Unweighted list entries default to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedSample {
    pub value: Value,
    pub weight: f64,
}

impl WeightedSample {
    pub fn new(value: Value, weight: f64) -> Self {
        WeightedSample { value, weight }
    }
}

/// A weighted state transition. Equality ignores the weight so a
/// transition can be located by its endpoints.
#[derive(Clone, Debug)]
pub struct WeightedTransition {
    pub from: Value,
    pub to: Value,
    pub weight: f64,
}

impl WeightedTransition {
    pub fn new(from: Value, to: Value, weight: f64) -> Self {
        WeightedTransition { from, to, weight }
    }
}

impl PartialEq for WeightedTransition {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

/// Order samples by weight; ties keep their relative order.
pub fn sort_by_weight(samples: &mut [WeightedSample], ascending: bool) {
    samples.sort_by(|a, b| {
        let ord = a.weight.total_cmp(&b.weight);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}
