// Series aligner - Merge sparsely sampled daily series onto one date axis
use crate::domain::chart::{AlignedSeries, ChartSeries};
use crate::domain::readings::{ExternalSeriesPoint, SensorSeriesPoint};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

pub const EXTERNAL_SERIES_LABEL: &str = "Outdoor Humidity";

/// A selected sensor's cached series with its resolved display label.
#[derive(Debug, Clone, Copy)]
pub struct LabeledSeries<'a> {
    pub label: &'a str,
    pub points: &'a [SensorSeriesPoint],
}

impl<'a> LabeledSeries<'a> {
    pub fn new(label: &'a str, points: &'a [SensorSeriesPoint]) -> Self {
        Self { label, points }
    }
}

/// Build chart data from the selected sensors (in selection order) and an
/// optional external series, which is always appended last.
///
/// Missing days are `None`, never zero. When no sensor contributes a single
/// point the result is empty, regardless of the external series.
pub fn align(sensors: &[LabeledSeries<'_>], external: Option<&[ExternalSeriesPoint]>) -> ChartSeries {
    if sensors.iter().all(|s| s.points.is_empty()) {
        return ChartSeries::default();
    }

    let external = external.filter(|points| !points.is_empty());

    let mut universe: BTreeSet<NaiveDate> = sensors
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect();
    if let Some(points) = external {
        universe.extend(points.iter().map(|p| p.date));
    }
    let date_axis: Vec<NaiveDate> = universe.into_iter().collect();

    let mut series_list: Vec<AlignedSeries> = sensors
        .iter()
        .map(|s| {
            let values = lookup(&date_axis, s.points.iter().map(|p| (p.date, p.average_value)));
            AlignedSeries::new(s.label.to_string(), values)
        })
        .collect();

    if let Some(points) = external {
        let values = lookup(&date_axis, points.iter().map(|p| (p.date, p.value)));
        series_list.push(AlignedSeries::new(EXTERNAL_SERIES_LABEL.to_string(), values));
    }

    ChartSeries::new(date_axis, series_list)
}

/// Position each value on the axis. The first point for a given day wins.
fn lookup(
    date_axis: &[NaiveDate],
    points: impl Iterator<Item = (NaiveDate, f64)>,
) -> Vec<Option<f64>> {
    let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
    for (date, value) in points {
        by_date.entry(date).or_insert(value);
    }
    date_axis.iter().map(|date| by_date.get(date).copied()).collect()
}
