use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::model::{Dataset, FilterOptions, Record};

// ---------------------------------------------------------------------------
// Choice – "All" or one concrete value
// ---------------------------------------------------------------------------

/// A single-choice control value.  On the wire `All` is the string `"All"`,
/// anything else is the bare value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// `All` accepts everything, `Only(v)` accepts exactly `v`.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => v == value,
        }
    }
}

impl<T: Serialize> Serialize for Choice<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Choice::All => serializer.serialize_str("All"),
            Choice::Only(v) => v.serialize(serializer),
        }
    }
}

/// Matches only the literal string `"All"`.
struct AllKeyword;

impl<'de> Deserialize<'de> for AllKeyword {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "All" {
            Ok(AllKeyword)
        } else {
            Err(de::Error::custom("expected \"All\""))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr<T> {
    All(AllKeyword),
    Only(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Choice<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ChoiceRepr::deserialize(deserializer)? {
            ChoiceRepr::All(AllKeyword) => Choice::All,
            ChoiceRepr::Only(v) => Choice::Only(v),
        })
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – the four control values
// ---------------------------------------------------------------------------

/// Current values of the four dashboard controls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub gender: Choice<String>,
    /// Always applied; an empty set matches nothing.
    pub contracts: BTreeSet<String>,
    pub payment: Choice<String>,
    pub senior: Choice<u8>,
}

impl FilterSelection {
    /// The initial control state: every contract ticked, everything else "All".
    pub fn everything(options: &FilterOptions) -> Self {
        FilterSelection {
            gender: Choice::All,
            contracts: options.contracts.iter().cloned().collect(),
            payment: Choice::All,
            senior: Choice::All,
        }
    }

    /// Whether a single record passes every constraint.
    pub fn matches(&self, rec: &Record) -> bool {
        self.contracts.contains(&rec.contract)
            && self.gender.accepts(&rec.gender)
            && self.payment.accepts(&rec.payment_method)
            && self.senior.accepts(&rec.senior_citizen)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows one render works on
// ---------------------------------------------------------------------------

/// Records of a dataset that pass a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the selected records within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let all = self.dataset.records();
        self.indices.iter().map(move |&i| &all[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the records that pass every constraint of `selection`.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}
