use std::fmt;

use super::model::Record;

/// Arithmetic mean, `0.0` for an empty input.
pub fn mean_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Pearson correlation coefficient of paired samples.
///
/// Returns `NaN` when fewer than two pairs are given or either side has zero
/// variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = mean_or_zero(xs.iter().copied());
    let my = mean_or_zero(ys.iter().copied());

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Correlation matrix over the numeric record fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Price,
    Bedrooms,
    Bathrooms,
    SqftLiving,
    SqftLot,
    Floors,
    YrBuilt,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::Price,
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::SqftLiving,
        NumericField::SqftLot,
        NumericField::Floors,
        NumericField::YrBuilt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericField::Price => "price",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::SqftLiving => "sqft_living",
            NumericField::SqftLot => "sqft_lot",
            NumericField::Floors => "floors",
            NumericField::YrBuilt => "yr_built",
        }
    }

    pub fn value(self, record: &Record) -> f64 {
        match self {
            NumericField::Price => record.price,
            NumericField::Bedrooms => record.bedrooms as f64,
            NumericField::Bathrooms => record.bathrooms,
            NumericField::SqftLiving => record.sqft_living as f64,
            NumericField::SqftLot => record.sqft_lot as f64,
            NumericField::Floors => record.floors,
            NumericField::YrBuilt => record.yr_built as f64,
        }
    }
}

const N_FIELDS: usize = NumericField::ALL.len();

/// Pairwise Pearson coefficients; undefined entries are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; N_FIELDS]; N_FIELDS],
}

impl CorrelationMatrix {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut columns: [Vec<f64>; N_FIELDS] = Default::default();
        for rec in records {
            for (col, field) in columns.iter_mut().zip(NumericField::ALL) {
                col.push(field.value(rec));
            }
        }

        let mut values = [[f64::NAN; N_FIELDS]; N_FIELDS];
        for i in 0..N_FIELDS {
            for j in i..N_FIELDS {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        CorrelationMatrix { values }
    }

    pub fn fields(&self) -> &'static [NumericField] {
        &NumericField::ALL
    }

    /// `None` when the coefficient is undefined for this view.
    pub fn get(&self, a: NumericField, b: NumericField) -> Option<f64> {
        let r = self.values[a as usize][b as usize];
        (!r.is_nan()).then_some(r)
    }

    pub fn cell(&self, a: NumericField, b: NumericField) -> CorrelationCell {
        CorrelationCell(self.get(a, b))
    }
}

/// Display adapter: two decimals, or `N/A` when undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationCell(pub Option<f64>);

impl fmt::Display for CorrelationCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "{r:.2}"),
            None => write!(f, "N/A"),
        }
    }
}
