// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use statbrowse_app::{Dimension, DimensionValue, Record};

const SAMPLE_MUNICIPALITIES: [&str; 6] = [
    "København",
    "Aarhus",
    "Odense",
    "Aalborg",
    "Esbjerg",
    "Randers",
];

const SAMPLE_QUARTERS: [&str; 8] = [
    "2022K1", "2022K2", "2022K3", "2022K4", "2023K1", "2023K2", "2023K3", "2023K4",
];

const SAMPLE_MONTHS: [&str; 6] = [
    "2023M07", "2023M08", "2023M09", "2023M10", "2023M11", "2023M12",
];

const SAMPLE_YEARS: [&str; 10] = [
    "2014", "2015", "2016", "2017", "2018", "2019", "2020", "2021", "2022", "2023",
];

pub fn dimension(id: &str, text: &str, values: &[&str]) -> Dimension {
    Dimension {
        id: id.to_owned(),
        text: text.to_owned(),
        values: values
            .iter()
            .map(|value| DimensionValue {
                id: (*value).to_owned(),
                text: (*value).to_owned(),
            })
            .collect(),
    }
}

fn municipality_dimension() -> Dimension {
    dimension("OMRÅDE", "municipality", &SAMPLE_MUNICIPALITIES)
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    title: &str,
    unit: &str,
    time_grain: &str,
    updated: &str,
    time_values: Option<&[&str]>,
    municipalities: i64,
    extra_dimensions: Vec<Dimension>,
) -> Record {
    let time_dim = time_values.map(|values| dimension("Tid", "time", values));
    let muni_dim = (municipalities > 0).then(municipality_dimension);

    let mut variables = Vec::new();
    if let Some(time) = &time_dim {
        variables.push(time.clone());
    }
    if let Some(muni) = &muni_dim {
        variables.push(muni.clone());
    }
    variables.extend(extra_dimensions);

    Record {
        id: id.to_owned(),
        title: title.to_owned(),
        unit: unit.to_owned(),
        time_grain: time_grain.to_owned(),
        updated: updated.to_owned(),
        variables,
        time_dim,
        muni_dim,
        n_municipalities: municipalities,
    }
}

/// A deterministic catalog snapshot used by `--demo` mode and tests:
/// Danish-statistics flavored records covering every facet combination the
/// view pipeline cares about, including records without a time or
/// municipality axis.
pub fn sample_records() -> Vec<Record> {
    vec![
        record(
            "FOLK1A",
            "Population at the first day of the quarter",
            "persons",
            "Quarterly",
            "2023-11-02T08:00:00Z",
            Some(&SAMPLE_QUARTERS),
            98,
            vec![
                dimension("KØN", "sex", &["Men", "Women"]),
                dimension("ALDER", "age", &["0-14", "15-24", "25-44", "45-64", "65+"]),
                dimension(
                    "CIVILSTAND",
                    "marital status",
                    &["Never married", "Married", "Divorced", "Widowed"],
                ),
            ],
        ),
        record(
            "BEF5",
            "Live births by mother's age",
            "persons",
            "Annual",
            "2024-02-09T06:30:00Z",
            Some(&SAMPLE_YEARS),
            98,
            vec![dimension("ALDERM", "age of mother", &["15-19", "20-29", "30-39", "40+"])],
        ),
        record(
            "BYG42",
            "Construction cost index for residential buildings",
            "index",
            "Quarterly",
            "2023-08-15T07:00:00Z",
            Some(&SAMPLE_QUARTERS),
            0,
            vec![dimension(
                "HOVEDTAL",
                "main figures",
                &["Total", "Materials", "Labour"],
            )],
        ),
        record(
            "NAN1",
            "Gross domestic product",
            "DKK",
            "Annual",
            "2024-03-29T05:45:00Z",
            Some(&SAMPLE_YEARS),
            0,
            vec![dimension(
                "TRANSAKT",
                "transaction",
                &["GDP", "Imports", "Exports"],
            )],
        ),
        record(
            "AUP01",
            "Registered unemployed persons",
            "persons",
            "Monthly",
            "2024-01-31T07:15:00Z",
            Some(&SAMPLE_MONTHS),
            98,
            vec![dimension("KØN", "sex", &["Men", "Women"])],
        ),
        record(
            "EJEN6",
            "Sales of real property",
            "DKK",
            "Quarterly",
            "2023-12-20T08:00:00Z",
            Some(&SAMPLE_QUARTERS),
            50,
            vec![dimension(
                "EJENDOMSKAT",
                "property category",
                &["One-family houses", "Owner-occupied flats", "Holiday homes"],
            )],
        ),
        record(
            "STRAF44",
            "Convictions by type of offence",
            "persons",
            "Annual",
            "2023-06-01T09:00:00Z",
            Some(&SAMPLE_YEARS),
            12,
            vec![dimension(
                "OVERTRAD",
                "type of offence",
                &["Penal code", "Traffic act", "Special acts"],
            )],
        ),
        record(
            "KIRKE1",
            "Members of the national church",
            "persons",
            "Annual",
            "2023-04-12T06:00:00Z",
            None,
            98,
            vec![dimension("MEDLEM", "membership", &["Members", "Non-members"])],
        ),
    ]
}
