use serde::{Deserialize, Serialize};

use super::aggregate::{
    mean_price_by_bedrooms, monthly_mean_price, price_histogram, rank_by_price, GroupMean,
    HistogramBin, PriceRanking,
};
use super::error::PipelineError;
use super::filter::{filtered_indices, FilterCriteria};
use super::model::{Dataset, Record, YearMonth};
use super::stats::{mean_or_zero, CorrelationMatrix};

/// Tunables for the derived aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOptions {
    /// Length of the most / least expensive lists.
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            histogram_bins: 50,
        }
    }
}

/// Headline numbers; the means are `0.0` for an empty view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_price: f64,
    pub mean_sqft_living: f64,
}

/// The records matching a [`FilterCriteria`] plus everything derived from
/// them. Holds dataset indices, so it is only meaningful next to the
/// dataset it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub summary: Summary,
    pub monthly: Vec<GroupMean<YearMonth>>,
    pub by_bedrooms: Vec<GroupMean<u32>>,
    pub ranking: PriceRanking,
    pub histogram: Vec<HistogramBin>,
    pub correlation: CorrelationMatrix,
}

impl FilteredView {
    pub fn compute(dataset: &Dataset, criteria: &FilterCriteria, options: &ViewOptions) -> Self {
        let indices = filtered_indices(dataset, criteria);
        let records: Vec<&Record> = indices.iter().map(|&i| &dataset.records()[i]).collect();

        let summary = Summary {
            count: indices.len(),
            mean_price: mean_or_zero(records.iter().map(|r| r.price)),
            mean_sqft_living: mean_or_zero(records.iter().map(|r| r.sqft_living as f64)),
        };

        FilteredView {
            summary,
            monthly: monthly_mean_price(dataset, &indices),
            by_bedrooms: mean_price_by_bedrooms(dataset, &indices),
            ranking: rank_by_price(dataset, &indices, options.top_n),
            histogram: price_histogram(dataset, &indices, options.histogram_bins),
            correlation: CorrelationMatrix::compute(records.iter().copied()),
            indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The matching records, in dataset order.
    pub fn records<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().map(move |&i| &dataset.records()[i])
    }
}

/// Filter `dataset` by `criteria` and derive every aggregate.
///
/// Only fails when there is no dataset to work on; an empty result is a
/// normal view.
pub fn apply(
    dataset: Option<&Dataset>,
    criteria: &FilterCriteria,
    options: &ViewOptions,
) -> Result<FilteredView, PipelineError> {
    let dataset = dataset.ok_or(PipelineError::InvalidInput)?;
    Ok(FilteredView::compute(dataset, criteria, options))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::tests::{arb_criteria, arb_dataset};
    use crate::data::filter::Bounds;
    use crate::data::model::tests::record;

    fn seattle_renton() -> Dataset {
        Dataset::from_records(vec![
            record("Seattle", 500_000.0, 3),
            record("Renton", 250_000.0, 2),
        ])
    }

    #[test]
    fn seattle_only_view() {
        let ds = seattle_renton();
        let criteria = FilterCriteria::new(Bounds::new(0.0, 1_000_000.0))
            .with_cities(["Seattle"])
            .with_bedrooms(Bounds::new(0, 10));

        let view = apply(Some(&ds), &criteria, &ViewOptions::default()).unwrap();
        assert_eq!(view.indices, vec![0]);
        assert_eq!(view.summary.count, 1);
        assert_eq!(view.summary.mean_price, 500_000.0);
        assert_eq!(view.records(&ds).map(|r| r.city.as_str()).collect::<Vec<_>>(), vec!["Seattle"]);
    }

    #[test]
    fn price_filter_with_unrestricted_cities() {
        let ds = seattle_renton();
        let criteria = FilterCriteria::new(Bounds::new(300_000.0, 1_000_000.0))
            .with_bedrooms(Bounds::new(0, 10));

        let view = FilteredView::compute(&ds, &criteria, &ViewOptions::default());
        assert_eq!(view.indices, vec![0]);
    }

    #[test]
    fn empty_view_reports_zero_means() {
        let ds = seattle_renton();
        let criteria = FilterCriteria::new(Bounds::new(2_000_000.0, 3_000_000.0));

        let view = FilteredView::compute(&ds, &criteria, &ViewOptions::default());
        assert!(view.is_empty());
        assert_eq!(view.summary, Summary::default());
        assert!(view.monthly.is_empty());
        assert!(view.by_bedrooms.is_empty());
        assert_eq!(view.ranking, PriceRanking::default());
        assert!(view.histogram.is_empty());
    }

    #[test]
    fn missing_dataset_is_invalid_input() {
        let criteria = FilterCriteria::new(Bounds::new(0.0, 1.0));
        assert_eq!(
            apply(None, &criteria, &ViewOptions::default()),
            Err(PipelineError::InvalidInput)
        );
    }

    #[test]
    fn aggregates_ignore_records_outside_the_view() {
        let mut ds_records = vec![
            record("Seattle", 400_000.0, 3),
            record("Seattle", 600_000.0, 3),
            record("Bellevue", 2_000_000.0, 5),
        ];
        ds_records[0].sqft_living = 1000;
        ds_records[1].sqft_living = 2000;
        let ds = Dataset::from_records(ds_records);
        let criteria = FilterCriteria::unrestricted(&ds).with_cities(["Seattle"]);

        let view = FilteredView::compute(&ds, &criteria, &ViewOptions::default());
        assert_eq!(view.summary.mean_price, 500_000.0);
        assert_eq!(view.summary.mean_sqft_living, 1500.0);
        assert_eq!(view.by_bedrooms.len(), 1);
        assert_eq!(view.ranking.highest, vec![1, 0]);
    }

    proptest! {
        #[test]
        fn recomputing_is_idempotent(ds in arb_dataset(), criteria in arb_criteria()) {
            let options = ViewOptions::default();
            let first = FilteredView::compute(&ds, &criteria, &options);
            let second = FilteredView::compute(&ds, &criteria, &options);
            // NaN != NaN, so the matrix is compared through its Debug output.
            prop_assert_eq!(&first.indices, &second.indices);
            prop_assert_eq!(first.summary, second.summary);
            prop_assert_eq!(&first.monthly, &second.monthly);
            prop_assert_eq!(&first.by_bedrooms, &second.by_bedrooms);
            prop_assert_eq!(&first.ranking, &second.ranking);
            prop_assert_eq!(&first.histogram, &second.histogram);
            prop_assert_eq!(format!("{:?}", first.correlation), format!("{:?}", second.correlation));
        }

        #[test]
        fn means_are_zero_exactly_when_empty(ds in arb_dataset(), criteria in arb_criteria()) {
            let view = FilteredView::compute(&ds, &criteria, &ViewOptions::default());
            // Generated prices and areas are strictly positive.
            prop_assert_eq!(view.summary.mean_price == 0.0, view.is_empty());
            prop_assert_eq!(view.summary.mean_sqft_living == 0.0, view.is_empty());
        }

        #[test]
        fn monthly_groups_partition_the_view(ds in arb_dataset(), criteria in arb_criteria()) {
            let view = FilteredView::compute(&ds, &criteria, &ViewOptions::default());
            let mut union: Vec<usize> = view.monthly.iter().flat_map(|g| g.indices.iter().copied()).collect();
            union.sort_unstable();
            prop_assert_eq!(union, view.indices.clone());
            prop_assert!(view.monthly.windows(2).all(|w| w[0].key < w[1].key));
        }
    }
}
