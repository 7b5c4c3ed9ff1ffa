//! Geological age index
//!
//! A fixed era → period → epoch → age hierarchy. Every age leaf carries an
//! integer id assigned in document order, starting at 1. The table is built
//! once per process ([`AgeIndex::global`]) and is read-only afterwards, so it
//! can be shared across requests without synchronization.
//!
//! Names are not unique across levels (e.g. a Silurian epoch and its only age
//! share a name). Lookups scan in document order and the first match wins.

mod data;
pub mod filter;

pub use filter::{filter_tree, is_eligible};

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeSet;

/// Age id type
pub type AgeId = u32;

static GLOBAL_INDEX: Lazy<AgeIndex> = Lazy::new(|| AgeIndex::from_table(data::ERAS));

/// Static table definition: era level
pub struct EraDef {
    pub name: &'static str,
    pub periods: &'static [PeriodDef],
}

/// Static table definition: period level
pub struct PeriodDef {
    pub name: &'static str,
    pub epochs: &'static [EpochDef],
}

/// Static table definition: epoch level, with its age names
pub struct EpochDef {
    pub name: &'static str,
    pub ages: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Era {
    pub name: String,
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub name: String,
    pub epochs: Vec<Epoch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Epoch {
    pub name: String,
    pub ages: Vec<Age>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Age {
    pub id: AgeId,
    pub name: String,
}

impl Era {
    fn age_ids(&self) -> Vec<AgeId> {
        self.periods.iter().flat_map(Period::age_ids).collect()
    }
}

impl Period {
    fn age_ids(&self) -> Vec<AgeId> {
        self.epochs.iter().flat_map(Epoch::age_ids).collect()
    }
}

impl Epoch {
    fn age_ids(&self) -> Vec<AgeId> {
        self.ages.iter().map(|age| age.id).collect()
    }
}

/// Read-only era → period → epoch → age lookup table
#[derive(Debug, Clone, Serialize)]
pub struct AgeIndex {
    eras: Vec<Era>,
}

impl AgeIndex {
    /// Process-wide index built from the bundled geological table
    pub fn global() -> &'static AgeIndex {
        &GLOBAL_INDEX
    }

    /// Build an index from a static table, numbering age leaves 1.. in document order
    pub fn from_table(table: &[EraDef]) -> Self {
        let mut next_id: AgeId = 1;
        let eras = table
            .iter()
            .map(|era| Era {
                name: era.name.to_string(),
                periods: era
                    .periods
                    .iter()
                    .map(|period| Period {
                        name: period.name.to_string(),
                        epochs: period
                            .epochs
                            .iter()
                            .map(|epoch| Epoch {
                                name: epoch.name.to_string(),
                                ages: epoch
                                    .ages
                                    .iter()
                                    .map(|name| {
                                        let id = next_id;
                                        next_id += 1;
                                        Age {
                                            id,
                                            name: name.to_string(),
                                        }
                                    })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { eras }
    }

    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    /// Every age leaf in id order
    pub fn ages(&self) -> impl Iterator<Item = &Age> {
        self.eras
            .iter()
            .flat_map(|era| &era.periods)
            .flat_map(|period| &period.epochs)
            .flat_map(|epoch| &epoch.ages)
    }

    /// Age ids named by `name`
    ///
    /// An era, period or epoch match yields every age leaf beneath it; an age
    /// match yields that single id; no match yields an empty list.
    pub fn ids_for_name(&self, name: &str) -> Vec<AgeId> {
        for era in &self.eras {
            if era.name == name {
                return era.age_ids();
            }
            for period in &era.periods {
                if period.name == name {
                    return period.age_ids();
                }
                for epoch in &period.epochs {
                    if epoch.name == name {
                        return epoch.age_ids();
                    }
                    if let Some(age) = epoch.ages.iter().find(|age| age.name == name) {
                        return vec![age.id];
                    }
                }
            }
        }
        Vec::new()
    }

    /// Every age id inside the inclusive span covered by `from_name` and `to_name`
    ///
    /// The span is `[min, max]` over the union of both names' ids, then
    /// expanded against the full index, so ages lying between the two bounds
    /// are included even though neither name resolves to them.
    pub fn ids_in_range(&self, from_name: &str, to_name: &str) -> Vec<AgeId> {
        let resolved: Vec<AgeId> = self
            .ids_for_name(from_name)
            .into_iter()
            .chain(self.ids_for_name(to_name))
            .collect();

        let (Some(&min), Some(&max)) = (resolved.iter().min(), resolved.iter().max()) else {
            return Vec::new();
        };

        self.ages()
            .map(|age| age.id)
            .filter(|id| (min..=max).contains(id))
            .collect()
    }

    /// Union of the ids named by each entry of `names`
    pub fn ids_for_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> BTreeSet<AgeId> {
        names
            .into_iter()
            .flat_map(|name| self.ids_for_name(name.trim()))
            .collect()
    }
}

/// True iff the two id sets share at least one id
pub fn has_overlap(a: &BTreeSet<AgeId>, b: &[AgeId]) -> bool {
    b.iter().any(|id| a.contains(id))
}
