// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Number of Danish municipalities; the denominator of the coverage label.
pub const MUNICIPALITY_COUNT: i64 = 98;

/// One category instance within a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DimensionValue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// One categorical axis of a record. Value order is meaningful (for example
/// chronological for the time axis) and is preserved verbatim from the
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub values: Vec<DimensionValue>,
}

/// One statistical-table descriptor as delivered by the catalog source.
/// Unknown source fields are ignored; missing fields take defaults so a
/// partially populated record still renders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, rename = "timeGrain")]
    pub time_grain: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub variables: Vec<Dimension>,
    #[serde(default, rename = "timeDim")]
    pub time_dim: Option<Dimension>,
    #[serde(default, rename = "muniDim")]
    pub muni_dim: Option<Dimension>,
    #[serde(default)]
    pub n_municipalities: i64,
}

impl Record {
    /// The `updated` stamp parsed as an RFC 3339 timestamp, if it is one.
    pub fn updated_timestamp(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.updated, &Rfc3339).ok()
    }

    /// Date-only component of `updated`: everything before the date/time
    /// separator.
    pub fn updated_date(&self) -> &str {
        self.updated.split('T').next().unwrap_or(&self.updated)
    }

    /// The non-time axes: `variables` minus the time dimension. Derived at
    /// read time, never stored.
    pub fn display_dimensions(&self) -> Vec<&Dimension> {
        match &self.time_dim {
            Some(time) => self
                .variables
                .iter()
                .filter(|dimension| dimension.id != time.id)
                .collect(),
            None => self.variables.iter().collect(),
        }
    }

    pub fn period_count(&self) -> usize {
        self.time_dim
            .as_ref()
            .map_or(0, |dimension| dimension.values.len())
    }

    /// "first–last" over the time axis values, empty when the time
    /// dimension is absent.
    pub fn period_range(&self) -> String {
        let Some(dimension) = &self.time_dim else {
            return String::new();
        };
        match (dimension.values.first(), dimension.values.last()) {
            (Some(first), Some(last)) => format!("{}–{}", first.text, last.text),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    SourceOrder,
    UpdatedDesc,
    UpdatedAsc,
    Title,
    MunicipalitiesDesc,
    MunicipalitiesAsc,
}

impl SortKey {
    pub const ALL: [Self; 6] = [
        Self::SourceOrder,
        Self::UpdatedDesc,
        Self::UpdatedAsc,
        Self::Title,
        Self::MunicipalitiesDesc,
        Self::MunicipalitiesAsc,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceOrder => "none",
            Self::UpdatedDesc => "updatedDesc",
            Self::UpdatedAsc => "updatedAsc",
            Self::Title => "title",
            Self::MunicipalitiesDesc => "municipalitiesDesc",
            Self::MunicipalitiesAsc => "municipalitiesAsc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::SourceOrder),
            "updatedDesc" => Some(Self::UpdatedDesc),
            "updatedAsc" => Some(Self::UpdatedAsc),
            "title" => Some(Self::Title),
            "municipalitiesDesc" => Some(Self::MunicipalitiesDesc),
            "municipalitiesAsc" => Some(Self::MunicipalitiesAsc),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceOrder => "source order",
            Self::UpdatedDesc => "updated (newest)",
            Self::UpdatedAsc => "updated (oldest)",
            Self::Title => "title",
            Self::MunicipalitiesDesc => "municipalities (most)",
            Self::MunicipalitiesAsc => "municipalities (fewest)",
        }
    }
}

/// One facet's selection: everything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetChoice {
    All,
    Value(String),
}

impl FacetChoice {
    /// Exact, case-sensitive match; `All` admits everything.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Value(chosen) => chosen == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Value(chosen) => chosen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub unit: FacetChoice,
    pub time_grain: FacetChoice,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            unit: FacetChoice::All,
            time_grain: FacetChoice::All,
        }
    }
}

/// Result of one catalog load: records in source order plus the number of
/// array elements that failed to decode and were skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadOutcome {
    pub records: Vec<Record>,
    pub skipped: usize,
}
