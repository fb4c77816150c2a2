/// Chart layer: aggregation of a filtered view into renderable specs.
///
/// ```text
///   FilteredView
///        │
///        ├──► churn_distribution   ─┐
///        ├──► tenure_by_churn       │
///        ├──► contract_by_churn     │
///        ├──► charges_scatter       ├──► ChartBundle
///        ├──► services_by_churn     │
///        ├──► correlation_heatmap   │
///        └──► tenure_boxplot       ─┘
/// ```

pub mod builders;
pub mod spec;
pub mod stats;

pub use spec::{ChartBundle, ChartId, ChartKind, ChartSpec};

use crate::data::filter::{filter, FilterSelection, FilteredView};
use crate::data::model::Dataset;

/// Run all seven builders over one view.
pub fn render_view(view: &FilteredView) -> ChartBundle {
    ChartBundle {
        churn_distribution: builders::churn_distribution(view),
        tenure_churn: builders::tenure_by_churn(view),
        contract_churn: builders::contract_by_churn(view),
        charges_scatter: builders::charges_scatter(view),
        services_churn: builders::services_by_churn(view),
        correlation_heatmap: builders::correlation_heatmap(view),
        tenure_boxplot: builders::tenure_boxplot(view),
    }
}

/// Filter then render.  Pure: the same inputs always give the same bundle.
pub fn render(dataset: &Dataset, selection: &FilterSelection) -> ChartBundle {
    let view = filter(dataset, selection);
    log::debug!(
        "Rendering {} of {} records for {selection:?}",
        view.len(),
        dataset.len()
    );
    render_view(&view)
}
