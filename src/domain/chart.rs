// Chart domain model
use chrono::NaiveDate;
use serde::Serialize;

/// A single line on the chart, positionally aligned to `ChartSeries::date_axis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl AlignedSeries {
    pub fn new(label: String, values: Vec<Option<f64>>) -> Self {
        Self { label, values }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub date_axis: Vec<NaiveDate>,
    pub series_list: Vec<AlignedSeries>,
}

impl ChartSeries {
    pub fn new(date_axis: Vec<NaiveDate>, series_list: Vec<AlignedSeries>) -> Self {
        Self {
            date_axis,
            series_list,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_axis.is_empty()
    }
}

/// What the dashboard should render for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "chart", rename_all = "snake_case")]
pub enum ChartView {
    /// Prompt the user to pick a sensor.
    NothingSelected,
    /// Sensors are selected but none has points yet.
    NoData,
    Chart(ChartSeries),
}

impl ChartView {
    pub fn from_chart(any_selected: bool, chart: ChartSeries) -> Self {
        if !any_selected {
            ChartView::NothingSelected
        } else if chart.is_empty() {
            ChartView::NoData
        } else {
            ChartView::Chart(chart)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_distinguishes_prompt_from_no_data() {
        assert_eq!(
            ChartView::from_chart(false, ChartSeries::default()),
            ChartView::NothingSelected
        );
        assert_eq!(
            ChartView::from_chart(true, ChartSeries::default()),
            ChartView::NoData
        );
    }

    #[test]
    fn test_view_serializes_tagged() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let chart = ChartSeries::new(
            vec![day],
            vec![AlignedSeries::new("A".to_string(), vec![None])],
        );
        let json = serde_json::to_value(ChartView::from_chart(true, chart)).unwrap();
        assert_eq!(json["state"], "chart");
        assert_eq!(json["chart"]["date_axis"][0], "2024-01-01");
        assert!(json["chart"]["series_list"][0]["values"][0].is_null());
    }
}
