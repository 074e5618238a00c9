use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};

/// Directed multigraph of currency exchange rates.
///
/// Rates are loaded once from the simulation input; after loading, callers run
/// [`ExchangeGraph::materialize_inverses`] so every known edge also has its
/// reciprocal. Conversion is a breadth-first search by hop count that multiplies
/// edge rates along the path and stops at the first time the target currency is
/// dequeued. The first-found rate is the contract; downstream commission and
/// cashback arithmetic is calibrated against it.
#[derive(Debug, Default, Clone)]
pub struct ExchangeGraph {
    edges: HashMap<String, Vec<(String, Decimal)>>,
}

impl ExchangeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rate(&mut self, from: &str, to: &str, rate: Decimal) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .push((to.to_string(), rate));
    }

    /// Adds the reciprocal edge `to -> from` at `1/rate` for every nonzero edge.
    ///
    /// Run once after all input rates are loaded, before any query.
    pub fn materialize_inverses(&mut self) {
        let mut inverses = Vec::new();
        for (from, targets) in &self.edges {
            for (to, rate) in targets {
                if !rate.is_zero() {
                    inverses.push((to.clone(), from.clone(), Decimal::ONE / rate));
                }
            }
        }
        for (from, to, rate) in inverses {
            self.add_rate(&from, &to, rate);
        }
    }

    /// Returns the conversion rate from `from` to `to`, or `Decimal::ZERO` if
    /// `to` is unreachable.
    ///
    /// The zero return is a sentinel, not a fault; callers must branch on it and
    /// treat the conversion as unavailable. Self-conversion yields `1` because
    /// the seed node is dequeued first.
    pub fn convert(&self, from: &str, to: &str) -> Decimal {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, Decimal)> = VecDeque::new();
        visited.insert(from);
        queue.push_back((from, Decimal::ONE));

        while let Some((currency, rate)) = queue.pop_front() {
            if currency == to {
                return rate;
            }
            if let Some(targets) = self.edges.get(currency) {
                for (next, edge_rate) in targets {
                    if visited.insert(next.as_str()) {
                        queue.push_back((next.as_str(), rate * edge_rate));
                    }
                }
            }
        }

        Decimal::ZERO
    }
}
