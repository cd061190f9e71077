use std::collections::BTreeMap;

use super::model::{Dataset, YearMonth};

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// One partition of a view together with its mean sale price.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean<K> {
    pub key: K,
    pub mean_price: f64,
    /// Dataset indices of the records in this partition, in dataset order.
    pub indices: Vec<usize>,
}

impl<K> GroupMean<K> {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Partition `indices` by `key` and average the price of each partition.
/// Groups come back sorted by key ascending.
pub fn group_mean_price<K, F>(dataset: &Dataset, indices: &[usize], key: F) -> Vec<GroupMean<K>>
where
    K: Ord,
    F: Fn(usize) -> K,
{
    let mut groups: BTreeMap<K, (f64, Vec<usize>)> = BTreeMap::new();
    for &idx in indices {
        let entry = groups.entry(key(idx)).or_default();
        entry.0 += dataset.records()[idx].price;
        entry.1.push(idx);
    }
    groups
        .into_iter()
        .map(|(key, (sum, indices))| GroupMean {
            key,
            mean_price: sum / indices.len() as f64,
            indices,
        })
        .collect()
}

/// Mean price per calendar month, chronological.
pub fn monthly_mean_price(dataset: &Dataset, indices: &[usize]) -> Vec<GroupMean<YearMonth>> {
    group_mean_price(dataset, indices, |i| dataset.records()[i].year_month())
}

/// Mean price per bedroom count, ascending.
pub fn mean_price_by_bedrooms(dataset: &Dataset, indices: &[usize]) -> Vec<GroupMean<u32>> {
    group_mean_price(dataset, indices, |i| dataset.records()[i].bedrooms)
}

// ---------------------------------------------------------------------------
// Price ranking
// ---------------------------------------------------------------------------

/// The most and least expensive records of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceRanking {
    /// Up to `n` indices, most expensive first.
    pub highest: Vec<usize>,
    /// Up to `n` indices, cheapest first.
    pub lowest: Vec<usize>,
}

/// One stable ascending sort by price: `lowest` is its head, `highest` its
/// tail reversed. Among equal prices the earliest records are the cheapest
/// and the latest the most expensive.
pub fn rank_by_price(dataset: &Dataset, indices: &[usize], n: usize) -> PriceRanking {
    let price = |i: usize| dataset.records()[i].price;

    let mut ascending = indices.to_vec();
    ascending.sort_by(|&a, &b| price(a).total_cmp(&price(b)));

    let highest = ascending.iter().rev().take(n).copied().collect();
    ascending.truncate(n);
    PriceRanking {
        highest,
        lowest: ascending,
    }
}

// ---------------------------------------------------------------------------
// Price histogram
// ---------------------------------------------------------------------------

/// Half-open price bucket `[lower, upper)`; the last bucket is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of prices over the view's own price range.
pub fn price_histogram(dataset: &Dataset, indices: &[usize], bins: usize) -> Vec<HistogramBin> {
    let prices: Vec<f64> = indices.iter().map(|&i| dataset.records()[i].price).collect();
    let Some((lo, hi)) = prices.iter().fold(None, |acc: Option<(f64, f64)>, &p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    }) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if lo == hi {
        return vec![HistogramBin {
            lower: lo,
            upper: hi,
            count: prices.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|b| HistogramBin {
            lower: lo + width * b as f64,
            upper: if b + 1 == bins { hi } else { lo + width * (b + 1) as f64 },
            count: 0,
        })
        .collect();
    for p in prices {
        let slot = (((p - lo) / width) as usize).min(bins - 1);
        out[slot].count += 1;
    }
    out
}
