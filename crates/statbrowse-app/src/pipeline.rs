// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::model::{FacetChoice, FilterSelection, Record, SortKey};

/// Orders a record snapshot by `key` without mutating the input. The sort
/// is stable, so records that compare equal keep their source order, and
/// total: every input record appears exactly once in the output.
pub fn sort_records(records: &[Record], key: SortKey) -> Vec<Record> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::SourceOrder => {}
        SortKey::UpdatedDesc => sorted.sort_by(|left, right| cmp_updated(left, right, true)),
        SortKey::UpdatedAsc => sorted.sort_by(|left, right| cmp_updated(left, right, false)),
        SortKey::Title => sorted.sort_by(|left, right| {
            left.title
                .to_lowercase()
                .cmp(&right.title.to_lowercase())
        }),
        SortKey::MunicipalitiesDesc => {
            sorted.sort_by(|left, right| right.n_municipalities.cmp(&left.n_municipalities));
        }
        SortKey::MunicipalitiesAsc => {
            sorted.sort_by(|left, right| left.n_municipalities.cmp(&right.n_municipalities));
        }
    }
    sorted
}

// Unparseable stamps order after every parseable one in both directions.
fn cmp_updated(left: &Record, right: &Record, newest_first: bool) -> Ordering {
    match (left.updated_timestamp(), right.updated_timestamp()) {
        (Some(left), Some(right)) => {
            if newest_first {
                right.cmp(&left)
            } else {
                left.cmp(&right)
            }
        }
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Keeps the records admitted by every facet of `selection`. Facets combine
/// conjunctively; an empty result is a valid outcome, not an error.
pub fn filter_records(records: &[Record], selection: &FilterSelection) -> Vec<Record> {
    records
        .iter()
        .filter(|record| {
            selection.unit.admits(&record.unit) && selection.time_grain.admits(&record.time_grain)
        })
        .cloned()
        .collect()
}

/// The distinct facet values observed in the loaded record set, in
/// first-seen order. Built once immediately after load and never
/// recomputed, even as the filtered view changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetDomains {
    pub units: Vec<String>,
    pub time_grains: Vec<String>,
}

impl FacetDomains {
    pub fn from_records(records: &[Record]) -> Self {
        let mut domains = Self::default();
        for record in records {
            push_distinct(&mut domains.units, &record.unit);
            push_distinct(&mut domains.time_grains, &record.time_grain);
        }
        domains
    }
}

// Records without a value for a facet contribute nothing to its domain.
fn push_distinct(values: &mut Vec<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_owned());
    }
}

/// Maps a facet cursor to its choice: 0 is All, 1..=len selects a domain
/// value, and anything out of range reads as All rather than failing.
pub fn choice_at(values: &[String], cursor: usize) -> FacetChoice {
    match cursor.checked_sub(1).and_then(|index| values.get(index)) {
        Some(value) => FacetChoice::Value(value.clone()),
        None => FacetChoice::All,
    }
}
