//! The seven chart builders.  Each one reads only the filtered view and
//! returns a self-contained [`ChartSpec`]; an empty view yields an empty chart.

use super::spec::{
    BarMode, BoxGroup, ChartId, ChartKind, ChartSpec, ScatterSeries, Series, Slice,
};
use super::stats::{integer_bins, mean, pearson, BoxSummary};
use crate::data::filter::FilteredView;
use crate::data::model::{Record, MONTHLY_CHARGES, SERVICE_COLUMNS, TENURE, TOTAL_CHARGES};

/// Records of the view grouped by churn label, groups in first-appearance order.
fn by_churn<'a>(view: &FilteredView<'a>) -> Vec<(&'a str, Vec<&'a Record>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Record>)> = Vec::new();
    for rec in view.records() {
        match groups.iter().position(|(label, _)| *label == rec.churn) {
            Some(i) => groups[i].1.push(rec),
            None => groups.push((rec.churn.as_str(), vec![rec])),
        }
    }
    groups
}

fn color(view: &FilteredView, label: &str) -> String {
    view.dataset().churn_palette().color_for(label).to_string()
}

/// Donut chart of the share of each churn label.
pub fn churn_distribution(view: &FilteredView) -> ChartSpec {
    let total = view.len();
    let slices = by_churn(view)
        .into_iter()
        .map(|(label, members)| Slice {
            label: label.to_string(),
            color: color(view, label),
            count: members.len(),
            fraction: members.len() as f64 / total as f64,
        })
        .collect();

    ChartSpec {
        id: ChartId::ChurnDistribution,
        title: "Churn Distribution".to_string(),
        kind: ChartKind::Pie {
            total,
            hole: 0.4,
            slices,
        },
    }
}

/// Tenure histogram, one grouped series per churn label over shared bins.
pub fn tenure_by_churn(view: &FilteredView) -> ChartSpec {
    let lo = view.records().map(|r| r.tenure).min();
    let hi = view.records().map(|r| r.tenure).max();
    let bins = match (lo, hi) {
        (Some(lo), Some(hi)) => integer_bins(lo, hi, view.len()),
        _ => Vec::new(),
    };

    let series = by_churn(view)
        .into_iter()
        .map(|(label, members)| {
            let mut counts = vec![0.0; bins.len()];
            for rec in members {
                if let Some(slot) = bins
                    .iter()
                    .position(|&(start, end)| rec.tenure >= start && rec.tenure < end)
                {
                    counts[slot] += 1.0;
                }
            }
            Series {
                name: label.to_string(),
                color: color(view, label),
                values: counts,
            }
        })
        .collect();

    ChartSpec {
        id: ChartId::TenureChurn,
        title: "Tenure Distribution by Churn Status".to_string(),
        kind: ChartKind::Histogram {
            x_label: TENURE.to_string(),
            bins,
            series,
            bar_mode: BarMode::Group,
        },
    }
}

/// Record count per contract type, stacked by churn label.
pub fn contract_by_churn(view: &FilteredView) -> ChartSpec {
    let mut categories: Vec<String> = Vec::new();
    for rec in view.records() {
        if !categories.contains(&rec.contract) {
            categories.push(rec.contract.clone());
        }
    }

    let series = by_churn(view)
        .into_iter()
        .map(|(label, members)| {
            let values = categories
                .iter()
                .map(|c| members.iter().filter(|r| &r.contract == c).count() as f64)
                .collect();
            Series {
                name: label.to_string(),
                color: color(view, label),
                values,
            }
        })
        .collect();

    ChartSpec {
        id: ChartId::ContractChurn,
        title: "Churn by Contract Type".to_string(),
        kind: ChartKind::Bar {
            x_label: "Contract".to_string(),
            y_label: "count".to_string(),
            categories,
            series,
            bar_mode: BarMode::Stack,
        },
    }
}

/// Monthly against total charges, one point per record.
pub fn charges_scatter(view: &FilteredView) -> ChartSpec {
    let series = by_churn(view)
        .into_iter()
        .map(|(label, members)| ScatterSeries {
            name: label.to_string(),
            color: color(view, label),
            points: members
                .iter()
                .map(|r| [r.monthly_charges, r.total_charges])
                .collect(),
        })
        .collect();

    ChartSpec {
        id: ChartId::ChargesScatter,
        title: "Monthly vs Total Charges".to_string(),
        kind: ChartKind::Scatter {
            x_label: MONTHLY_CHARGES.to_string(),
            y_label: TOTAL_CHARGES.to_string(),
            series,
        },
    }
}

/// Mean of each service flag per churn label, in long form (one bar per
/// service and label).  Labels are sorted, matching a group-by.
pub fn services_by_churn(view: &FilteredView) -> ChartSpec {
    let mut groups = by_churn(view);
    groups.sort_by(|a, b| a.0.cmp(b.0));

    let series = groups
        .into_iter()
        .map(|(label, members)| {
            let values = (0..SERVICE_COLUMNS.len())
                .map(|i| {
                    let flags: Vec<f64> = members.iter().map(|r| f64::from(r.services[i])).collect();
                    mean(&flags).unwrap_or(0.0)
                })
                .collect();
            Series {
                name: label.to_string(),
                color: color(view, label),
                values,
            }
        })
        .collect();

    ChartSpec {
        id: ChartId::ServicesChurn,
        title: "Service Usage by Churn Status".to_string(),
        kind: ChartKind::Bar {
            x_label: "variable".to_string(),
            y_label: "value".to_string(),
            categories: SERVICE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            series,
            bar_mode: BarMode::Group,
        },
    }
}

/// Pairwise Pearson correlation of the three numeric columns.
pub fn correlation_heatmap(view: &FilteredView) -> ChartSpec {
    let columns: [(&str, Vec<f64>); 3] = [
        (TENURE, view.records().map(|r| r.tenure as f64).collect()),
        (MONTHLY_CHARGES, view.records().map(|r| r.monthly_charges).collect()),
        (TOTAL_CHARGES, view.records().map(|r| r.total_charges).collect()),
    ];

    let cells: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|(_, xs)| columns.iter().map(|(_, ys)| pearson(xs, ys)).collect())
        .collect();

    ChartSpec {
        id: ChartId::CorrelationHeatmap,
        title: "Feature Correlation Heatmap".to_string(),
        kind: ChartKind::Heatmap {
            labels: columns.iter().map(|(name, _)| name.to_string()).collect(),
            cells,
            color_scale: "Viridis".to_string(),
            annotate: true,
        },
    }
}

/// Tenure quartiles, whiskers and outliers per churn label.
pub fn tenure_boxplot(view: &FilteredView) -> ChartSpec {
    let groups = by_churn(view)
        .into_iter()
        .filter_map(|(label, members)| {
            let tenures: Vec<f64> = members.iter().map(|r| r.tenure as f64).collect();
            Some(BoxGroup {
                name: label.to_string(),
                color: color(view, label),
                summary: BoxSummary::from_values(&tenures)?,
            })
        })
        .collect();

    ChartSpec {
        id: ChartId::TenureBoxplot,
        title: "Tenure Box Plot by Churn Status".to_string(),
        kind: ChartKind::Box {
            y_label: TENURE.to_string(),
            groups,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, Choice, FilterSelection};
    use crate::data::model::Dataset;

    fn rec(tenure: i64, monthly: f64, total: f64, contract: &str, churn: &str) -> Record {
        Record {
            gender: "Female".into(),
            senior_citizen: 0,
            contract: contract.into(),
            payment_method: "Electronic check".into(),
            tenure,
            monthly_charges: monthly,
            total_charges: total,
            churn: churn.into(),
            services: if churn == "Yes" { [1, 0, 0, 0, 1, 1] } else { [1, 1, 1, 1, 0, 0] },
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                rec(1, 70.0, 70.0, "Month-to-month", "Yes"),
                rec(24, 60.0, 1440.0, "One year", "No"),
                rec(2, 80.0, 160.0, "Month-to-month", "Yes"),
                rec(60, 20.0, 1200.0, "Two year", "No"),
                rec(36, 40.0, 1440.0, "One year", "No"),
            ],
            0,
        )
    }

    fn everything(ds: &Dataset) -> FilterSelection {
        FilterSelection::everything(ds.options())
    }

    fn nothing() -> FilterSelection {
        FilterSelection {
            gender: Choice::Only("Male".into()),
            ..FilterSelection::default()
        }
    }

    #[test]
    fn churn_distribution_reports_proportions() {
        let ds = dataset();
        let chart = churn_distribution(&filter(&ds, &everything(&ds)));
        let ChartKind::Pie { total, slices, hole } = chart.kind else {
            panic!("expected a pie");
        };
        assert_eq!(total, 5);
        assert_eq!(hole, 0.4);
        assert_eq!(slices[0].label, "Yes");
        assert_eq!(slices[0].count, 2);
        assert!((slices[0].fraction - 0.4).abs() < 1e-12);
        assert_eq!(slices[1].count, 3);
    }

    #[test]
    fn tenure_histogram_counts_every_record_once() {
        let ds = dataset();
        let chart = tenure_by_churn(&filter(&ds, &everything(&ds)));
        let ChartKind::Histogram { bins, series, .. } = chart.kind else {
            panic!("expected a histogram");
        };
        assert_eq!(bins.first().unwrap().0, 1);
        let counted: f64 = series.iter().flat_map(|s| s.values.iter()).sum();
        assert_eq!(counted, 5.0);
        assert!(series.iter().all(|s| s.values.len() == bins.len()));
    }

    #[test]
    fn contract_counts_are_split_by_churn() {
        let ds = dataset();
        let chart = contract_by_churn(&filter(&ds, &everything(&ds)));
        let ChartKind::Bar { categories, series, bar_mode, .. } = chart.kind else {
            panic!("expected bars");
        };
        assert_eq!(bar_mode, BarMode::Stack);
        assert_eq!(categories, vec!["Month-to-month", "One year", "Two year"]);
        assert_eq!(series[0].name, "Yes");
        assert_eq!(series[0].values, vec![2.0, 0.0, 0.0]);
        assert_eq!(series[1].values, vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn scatter_keeps_one_point_per_record() {
        let ds = dataset();
        let chart = charges_scatter(&filter(&ds, &everything(&ds)));
        let ChartKind::Scatter { series, .. } = chart.kind else {
            panic!("expected a scatter");
        };
        let points: usize = series.iter().map(|s| s.points.len()).sum();
        assert_eq!(points, 5);
        assert!(series[0].points.contains(&[80.0, 160.0]));
    }

    #[test]
    fn service_means_are_grouped_by_sorted_churn_label() {
        let ds = dataset();
        let chart = services_by_churn(&filter(&ds, &everything(&ds)));
        let ChartKind::Bar { categories, series, .. } = chart.kind else {
            panic!("expected bars");
        };
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0], "OnlineSecurity");
        assert_eq!(series[0].name, "No");
        assert_eq!(series[0].values, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(series[1].name, "Yes");
        assert_eq!(series[1].values, vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let ds = dataset();
        let chart = correlation_heatmap(&filter(&ds, &everything(&ds)));
        let ChartKind::Heatmap { labels, cells, .. } = chart.kind else {
            panic!("expected a heatmap");
        };
        assert_eq!(labels, vec!["tenure", "MonthlyCharges", "TotalCharges"]);
        for i in 0..3 {
            assert!((cells[i][i].unwrap() - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(cells[i][j], cells[j][i]);
            }
        }
    }

    #[test]
    fn boxplot_has_one_group_per_churn_label() {
        let ds = dataset();
        let chart = tenure_boxplot(&filter(&ds, &everything(&ds)));
        let ChartKind::Box { groups, .. } = chart.kind else {
            panic!("expected a box plot");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].summary.median, 1.5);
        assert_eq!(groups[1].summary.median, 36.0);
    }

    #[test]
    fn every_builder_tolerates_an_empty_view() {
        let ds = dataset();
        let view = filter(&ds, &nothing());
        assert!(view.is_empty());
        for chart in [
            churn_distribution(&view),
            tenure_by_churn(&view),
            contract_by_churn(&view),
            charges_scatter(&view),
            services_by_churn(&view),
            correlation_heatmap(&view),
            tenure_boxplot(&view),
        ] {
            assert!(chart.is_empty(), "{:?} should be empty", chart.id);
        }
    }

    #[test]
    fn single_row_view_has_undefined_correlations() {
        let ds = dataset();
        let sel = FilterSelection {
            contracts: ["Two year".to_string()].into(),
            ..everything(&ds)
        };
        let chart = correlation_heatmap(&filter(&ds, &sel));
        assert!(chart.is_empty());
    }
}
