// Chart series domain models
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DashboardError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub color: Option<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: String,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub period_days: u32,
    pub charts: BTreeMap<String, Chart>,
}

#[derive(Deserialize)]
struct ChartsWire {
    #[serde(default)]
    charts: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct ChartWire {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: ChartDataWire,
    #[serde(default)]
    options: Value,
}

#[derive(Deserialize, Default)]
struct ChartDataWire {
    #[serde(default)]
    labels: Vec<Value>,
    #[serde(default)]
    datasets: Vec<DatasetWire>,
}

#[derive(Deserialize)]
struct DatasetWire {
    #[serde(default)]
    label: String,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(rename = "borderColor", default)]
    border_color: Option<Value>,
}

impl ChartSet {
    /// Parse a /dashboard/charts payload. Individual charts that fail to
    /// decode are dropped with a warning.
    pub fn from_json(payload: Value, period_days: u32) -> Result<Self> {
        let wire: ChartsWire = serde_json::from_value(payload)
            .map_err(|e| DashboardError::MalformedData(format!("charts payload: {}", e)))?;

        let mut charts = BTreeMap::new();
        for (name, raw) in wire.charts {
            match serde_json::from_value::<ChartWire>(raw) {
                Ok(chart) => {
                    charts.insert(name, chart.into_chart());
                }
                Err(e) => {
                    tracing::warn!(chart = %name, error = %e, "Skipping malformed chart");
                }
            }
        }

        Ok(Self {
            period_days,
            charts,
        })
    }
}

impl ChartWire {
    fn into_chart(self) -> Chart {
        let title = self
            .options
            .pointer("/plugins/title/text")
            .and_then(Value::as_str)
            .map(str::to_string);

        let labels = self
            .data
            .labels
            .into_iter()
            .map(|label| match label {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        let datasets = self
            .data
            .datasets
            .into_iter()
            .map(|d| Dataset {
                label: d.label,
                // Single-colour datasets only; per-point colour arrays are ignored
                color: d.border_color.and_then(|c| c.as_str().map(str::to_string)),
                // Non-numeric points (e.g. scatter objects) collapse to 0
                values: d.data.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect(),
            })
            .collect();

        Chart {
            kind: self.kind.unwrap_or_else(|| "line".to_string()),
            title,
            labels,
            datasets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chart_set() {
        let set = ChartSet::from_json(
            json!({
                "charts": {
                    "performance_overview": {
                        "type": "line",
                        "data": {
                            "labels": ["vs Arsenal", "vs Spurs"],
                            "datasets": [
                                { "label": "Goals Scored", "data": [2, 3], "borderColor": "#34a853" },
                                { "label": "Goals Conceded", "data": [1, 0] }
                            ]
                        },
                        "options": { "plugins": { "title": { "display": true, "text": "Goals (Last 30 Days)" } } }
                    },
                    "broken": { "data": { "datasets": "nope" } }
                },
                "total_charts": 2
            }),
            30,
        )
        .unwrap();

        assert_eq!(set.charts.len(), 1);
        let chart = &set.charts["performance_overview"];
        assert_eq!(chart.title.as_deref(), Some("Goals (Last 30 Days)"));
        assert_eq!(chart.datasets[0].values, vec![2.0, 3.0]);
        assert_eq!(chart.datasets[0].color.as_deref(), Some("#34a853"));
        assert_eq!(chart.labels, vec!["vs Arsenal", "vs Spurs"]);
    }

    #[test]
    fn test_empty_payload_is_empty_set() {
        let set = ChartSet::from_json(json!({}), 7).unwrap();
        assert!(set.charts.is_empty());
        assert_eq!(set.period_days, 7);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        assert!(ChartSet::from_json(json!("charts"), 7).is_err());
    }
}
