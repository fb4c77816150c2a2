use serde::Serialize;

use super::stats::BoxSummary;

/// Stable identifiers of the seven dashboard charts; also the DOM ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartId {
    ChurnDistribution,
    TenureChurn,
    ContractChurn,
    ChargesScatter,
    ServicesChurn,
    CorrelationHeatmap,
    TenureBoxplot,
}

impl ChartId {
    pub const ALL: [ChartId; 7] = [
        ChartId::ChurnDistribution,
        ChartId::TenureChurn,
        ChartId::ContractChurn,
        ChartId::ChargesScatter,
        ChartId::ServicesChurn,
        ChartId::CorrelationHeatmap,
        ChartId::TenureBoxplot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartId::ChurnDistribution => "churn-distribution",
            ChartId::TenureChurn => "tenure-churn",
            ChartId::ContractChurn => "contract-churn",
            ChartId::ChargesScatter => "charges-scatter",
            ChartId::ServicesChurn => "services-churn",
            ChartId::CorrelationHeatmap => "correlation-heatmap",
            ChartId::TenureBoxplot => "tenure-boxplot",
        }
    }
}

/// How bars of several series share a category slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Group,
    Stack,
}

/// One named, coloured series of numbers aligned with a category axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub color: String,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub name: String,
    pub color: String,
    pub summary: BoxSummary,
}

/// Chart data, independent of any rendering technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Pie {
        total: usize,
        /// Fraction of the radius left empty (donut).
        hole: f64,
        slices: Vec<Slice>,
    },
    Histogram {
        x_label: String,
        /// `[start, end)` edges shared by every series.
        bins: Vec<(i64, i64)>,
        series: Vec<Series>,
        bar_mode: BarMode,
    },
    Bar {
        x_label: String,
        y_label: String,
        categories: Vec<String>,
        series: Vec<Series>,
        bar_mode: BarMode,
    },
    Scatter {
        x_label: String,
        y_label: String,
        series: Vec<ScatterSeries>,
    },
    Heatmap {
        labels: Vec<String>,
        /// Row-major; `None` where the value is undefined.
        cells: Vec<Vec<Option<f64>>>,
        color_scale: String,
        annotate: bool,
    },
    Box {
        y_label: String,
        groups: Vec<BoxGroup>,
    },
}

/// One renderable chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub title: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

impl ChartSpec {
    /// True when the chart has nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Pie { total, .. } => *total == 0,
            ChartKind::Histogram { series, .. } | ChartKind::Bar { series, .. } => {
                series.is_empty()
            }
            ChartKind::Scatter { series, .. } => series.iter().all(|s| s.points.is_empty()),
            ChartKind::Heatmap { cells, .. } => cells.iter().flatten().all(Option::is_none),
            ChartKind::Box { groups, .. } => groups.is_empty(),
        }
    }
}

/// The seven charts of one render, always published together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBundle {
    pub churn_distribution: ChartSpec,
    pub tenure_churn: ChartSpec,
    pub contract_churn: ChartSpec,
    pub charges_scatter: ChartSpec,
    pub services_churn: ChartSpec,
    pub correlation_heatmap: ChartSpec,
    pub tenure_boxplot: ChartSpec,
}

impl ChartBundle {
    /// The charts in [`ChartId::ALL`] order.
    pub fn charts(&self) -> [&ChartSpec; 7] {
        [
            &self.churn_distribution,
            &self.tenure_churn,
            &self.contract_churn,
            &self.charges_scatter,
            &self.services_churn,
            &self.correlation_heatmap,
            &self.tenure_boxplot,
        ]
    }
}
