use serde_json::{json, Value};

use crate::charts::spec::{BarMode, ChartKind, ChartSpec};

// ---------------------------------------------------------------------------
// ChartSpec → plotly.js figure
// ---------------------------------------------------------------------------

/// Convert a chart into a plotly.js figure (`{"data": [...], "layout": {...}}`).
pub fn figure(spec: &ChartSpec) -> Value {
    let (data, mut layout) = match &spec.kind {
        ChartKind::Pie { hole, slices, .. } => {
            let trace = json!({
                "type": "pie",
                "labels": slices.iter().map(|s| &s.label).collect::<Vec<_>>(),
                "values": slices.iter().map(|s| s.count).collect::<Vec<_>>(),
                "marker": { "colors": slices.iter().map(|s| &s.color).collect::<Vec<_>>() },
                "hole": hole,
                "sort": false,
            });
            (vec![trace], json!({}))
        }
        ChartKind::Histogram {
            x_label,
            bins,
            series,
            bar_mode,
        } => {
            let centers: Vec<f64> = bins
                .iter()
                .map(|&(start, end)| (start + end) as f64 / 2.0 - 0.5)
                .collect();
            let width = bins.first().map(|&(start, end)| end - start).unwrap_or(1);
            let traces = series
                .iter()
                .map(|s| {
                    json!({
                        "type": "bar",
                        "name": s.name,
                        "x": centers,
                        "y": s.values,
                        "marker": { "color": s.color },
                        "customdata": bins,
                        "hovertemplate": "%{customdata[0]}–%{customdata[1]}: %{y}<extra>%{fullData.name}</extra>",
                    })
                })
                .collect();
            let layout = json!({
                "barmode": bar_mode_name(*bar_mode),
                "bargap": 0.0,
                "xaxis": { "title": { "text": x_label }, "dtick": width },
                "yaxis": { "title": { "text": "count" } },
                "legend": { "title": { "text": "Churn" } },
            });
            (traces, layout)
        }
        ChartKind::Bar {
            x_label,
            y_label,
            categories,
            series,
            bar_mode,
        } => {
            let traces = series
                .iter()
                .map(|s| {
                    json!({
                        "type": "bar",
                        "name": s.name,
                        "x": categories,
                        "y": s.values,
                        "marker": { "color": s.color },
                    })
                })
                .collect();
            let layout = json!({
                "barmode": bar_mode_name(*bar_mode),
                "xaxis": { "title": { "text": x_label } },
                "yaxis": { "title": { "text": y_label } },
                "legend": { "title": { "text": "Churn" } },
            });
            (traces, layout)
        }
        ChartKind::Scatter {
            x_label,
            y_label,
            series,
        } => {
            let traces = series
                .iter()
                .map(|s| {
                    json!({
                        "type": "scattergl",
                        "mode": "markers",
                        "name": s.name,
                        "x": s.points.iter().map(|p| p[0]).collect::<Vec<_>>(),
                        "y": s.points.iter().map(|p| p[1]).collect::<Vec<_>>(),
                        "marker": { "color": s.color },
                    })
                })
                .collect();
            let layout = json!({
                "xaxis": { "title": { "text": x_label } },
                "yaxis": { "title": { "text": y_label } },
                "legend": { "title": { "text": "Churn" } },
            });
            (traces, layout)
        }
        ChartKind::Heatmap {
            labels,
            cells,
            color_scale,
            annotate,
        } => {
            let mut trace = json!({
                "type": "heatmap",
                "x": labels,
                "y": labels,
                "z": cells,
                "colorscale": color_scale,
                "zmin": -1.0,
                "zmax": 1.0,
            });
            if *annotate {
                trace["texttemplate"] = json!("%{z:.3f}");
            }
            let layout = json!({ "yaxis": { "autorange": "reversed" } });
            (vec![trace], layout)
        }
        ChartKind::Box { y_label, groups } => {
            let mut traces = Vec::with_capacity(groups.len() * 2);
            for g in groups {
                let s = &g.summary;
                traces.push(json!({
                    "type": "box",
                    "name": g.name,
                    "x": [g.name],
                    "q1": [s.q1],
                    "median": [s.median],
                    "q3": [s.q3],
                    "lowerfence": [s.lower_whisker],
                    "upperfence": [s.upper_whisker],
                    "mean": [s.mean],
                    "marker": { "color": g.color },
                }));
                if !s.outliers.is_empty() {
                    traces.push(json!({
                        "type": "scatter",
                        "mode": "markers",
                        "name": format!("{} outliers", g.name),
                        "showlegend": false,
                        "x": vec![&g.name; s.outliers.len()],
                        "y": s.outliers,
                        "marker": { "color": g.color },
                    }));
                }
            }
            let layout = json!({
                "yaxis": { "title": { "text": y_label } },
                "legend": { "title": { "text": "Churn" } },
            });
            (traces, layout)
        }
    };

    layout["title"] = json!({ "text": spec.title });
    if spec.is_empty() {
        layout["annotations"] = json!([{
            "text": "No data for the current filters",
            "showarrow": false,
            "xref": "paper",
            "yref": "paper",
            "x": 0.5,
            "y": 0.5,
        }]);
        layout["xaxis"]["visible"] = json!(false);
        layout["yaxis"]["visible"] = json!(false);
    }

    json!({ "data": data, "layout": layout })
}

fn bar_mode_name(mode: BarMode) -> &'static str {
    match mode {
        BarMode::Group => "group",
        BarMode::Stack => "stack",
    }
}
