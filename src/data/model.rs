use std::fmt;

use serde::Serialize;

use crate::color::ChurnPalette;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const GENDER: &str = "gender";
pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
pub const CONTRACT: &str = "Contract";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const TENURE: &str = "tenure";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";
pub const CHURN: &str = "Churn";

/// The six subscription columns that get binarized at load time.
/// Every per-service array in the crate uses this order.
pub const SERVICE_COLUMNS: [&str; 6] = [
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
];

/// Every column the loader insists on.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    GENDER,
    SENIOR_CITIZEN,
    CONTRACT,
    PAYMENT_METHOD,
    TENURE,
    MONTHLY_CHARGES,
    TOTAL_CHARGES,
    CHURN,
    SERVICE_COLUMNS[0],
    SERVICE_COLUMNS[1],
    SERVICE_COLUMNS[2],
    SERVICE_COLUMNS[3],
    SERVICE_COLUMNS[4],
    SERVICE_COLUMNS[5],
];

// ---------------------------------------------------------------------------
// RawValue – a single cell before cleaning
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it comes out of a CSV, JSON or Parquet file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Null => write!(f, "<null>"),
        }
    }
}

impl RawValue {
    /// Numeric coercion. Text is trimmed and parsed; blanks, placeholders
    /// and NaN all count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Float(v) => *v,
            RawValue::Integer(i) => *i as f64,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Bool(_) | RawValue::Null => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    /// Integer coercion that also accepts whole floats (`"5.0"`, `5.0`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(i) => Some(*i),
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| whole(s.parse::<f64>().ok()?))
            }
            RawValue::Float(v) => whole(*v),
            RawValue::Bool(b) => Some(i64::from(*b)),
            RawValue::Null => None,
        }
    }

    /// Text view used for categorical columns.
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn whole(v: f64) -> Option<i64> {
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (in_range && v.fract() == 0.0).then_some(v as i64)
}

// ---------------------------------------------------------------------------
// Record – one cleaned customer row
// ---------------------------------------------------------------------------

/// One customer after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub gender: String,
    pub senior_citizen: u8,
    pub contract: String,
    pub payment_method: String,
    pub tenure: i64,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub churn: String,
    /// 0/1 flags in [`SERVICE_COLUMNS`] order.
    pub services: [u8; 6],
}

// ---------------------------------------------------------------------------
// FilterOptions – values offered by the UI controls
// ---------------------------------------------------------------------------

/// Distinct categorical values, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub genders: Vec<String>,
    pub contracts: Vec<String>,
    pub payment_methods: Vec<String>,
}

impl FilterOptions {
    fn collect(records: &[Record]) -> Self {
        let mut options = FilterOptions::default();
        for rec in records {
            push_distinct(&mut options.genders, &rec.gender);
            push_distinct(&mut options.contracts, &rec.contract);
            push_distinct(&mut options.payment_methods, &rec.payment_method);
        }
        options
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned table
// ---------------------------------------------------------------------------

/// The cleaned dataset. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    options: FilterOptions,
    churn_palette: ChurnPalette,
    dropped_rows: usize,
}

impl Dataset {
    /// Build the option lists and the churn palette from cleaned records.
    pub fn from_records(records: Vec<Record>, dropped_rows: usize) -> Self {
        let options = FilterOptions::collect(&records);
        let churn_palette = ChurnPalette::new(records.iter().map(|r| r.churn.as_str()));
        Dataset {
            records,
            options,
            churn_palette,
            dropped_rows,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Colours assigned to each churn label for the dataset's lifetime.
    pub fn churn_palette(&self) -> &ChurnPalette {
        &self.churn_palette
    }

    /// Rows removed during cleaning because `TotalCharges` was not numeric.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
