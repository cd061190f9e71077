use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Bounds – inclusive interval
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`. An inverted interval contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Single-value interval, e.g. "exactly 3 bedrooms".
    pub fn exactly(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – the user's current selection
// ---------------------------------------------------------------------------

/// City allow-list plus price and bedroom intervals.
///
/// An empty `cities` set means *every* city passes, not none.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub cities: BTreeSet<String>,
    pub price: Bounds<f64>,
    /// `None` leaves bedroom counts unconstrained.
    pub bedrooms: Option<Bounds<u32>>,
}

impl FilterCriteria {
    pub fn new(price: Bounds<f64>) -> Self {
        Self {
            cities: BTreeSet::new(),
            price,
            bedrooms: None,
        }
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bedrooms(mut self, bedrooms: Bounds<u32>) -> Self {
        self.bedrooms = Some(bedrooms);
        self
    }

    /// Criteria that every record of `dataset` satisfies.
    pub fn unrestricted(dataset: &Dataset) -> Self {
        let (lo, hi) = dataset.price_bounds().unwrap_or((0.0, 0.0));
        Self::new(Bounds::new(lo, hi))
    }

    /// The selection a freshly opened dashboard starts with: the preferred
    /// cities that exist in the data, and prices from the minimum up to
    /// `price_ceiling_ratio` of the maximum.
    pub fn initial(dataset: &Dataset, preferred_cities: &[String], price_ceiling_ratio: f64) -> Self {
        let (lo, hi) = dataset.price_bounds().unwrap_or((0.0, 0.0));
        let ceiling = (hi * price_ceiling_ratio).max(lo);
        Self::new(Bounds::new(lo, ceiling)).with_cities(
            preferred_cities
                .iter()
                .filter(|c| dataset.cities().contains(c.as_str()))
                .cloned(),
        )
    }

    /// Whether the city allow-list restricts anything.
    pub fn city_filter_active(&self) -> bool {
        !self.cities.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.passes_city(record)
            && self.price.contains(record.price)
            && self.bedrooms.map_or(true, |b| b.contains(record.bedrooms))
    }

    fn passes_city(&self, record: &Record) -> bool {
        let city_filter_active = self.city_filter_active();
        if !city_filter_active {
            return true;
        }
        self.cities.contains(&record.city)
    }
}

/// Return indices of records that pass every active filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}
