use minijinja::{context, Environment};
use serde::Serialize;

use crate::charts::ChartId;
use crate::data::filter::{Choice, FilterSelection};
use crate::data::model::FilterOptions;

pub const TITLE: &str = "Customer Churn Analysis Dashboard";

/// The `.html` name turns on minijinja's HTML autoescaping.
const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = include_str!("../../assets/dashboard.html");

/// Chart placeholders by row, with Bootstrap column widths.
const ROWS: [&[(ChartId, u8)]; 4] = [
    &[
        (ChartId::ChurnDistribution, 4),
        (ChartId::TenureChurn, 4),
        (ChartId::ContractChurn, 4),
    ],
    &[(ChartId::TenureBoxplot, 6)],
    &[(ChartId::ChargesScatter, 6), (ChartId::ServicesChurn, 6)],
    &[(ChartId::CorrelationHeatmap, 6)],
];

#[derive(Serialize)]
struct Placeholder {
    id: &'static str,
    width: u8,
}

#[derive(Serialize)]
struct Toggle<'a> {
    label: &'a str,
    value: &'a str,
    checked: bool,
}

/// Render the static dashboard page: filter controls plus chart placeholders.
pub fn page(
    options: &FilterOptions,
    initial: &FilterSelection,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;

    let contracts: Vec<Toggle> = options
        .contracts
        .iter()
        .map(|c| Toggle {
            label: c,
            value: c,
            checked: initial.contracts.contains(c),
        })
        .collect();

    let senior: Vec<Toggle> = [
        ("All", "All", Choice::All),
        ("Yes", "1", Choice::Only(1)),
        ("No", "0", Choice::Only(0)),
    ]
    .into_iter()
    .map(|(label, value, choice)| Toggle {
        label,
        value,
        checked: initial.senior == choice,
    })
    .collect();

    let rows: Vec<Vec<Placeholder>> = ROWS
        .iter()
        .map(|row| {
            row.iter()
                .map(|&(id, width)| Placeholder {
                    id: id.as_str(),
                    width,
                })
                .collect()
        })
        .collect();

    let template = env.get_template(TEMPLATE_NAME)?;
    template.render(context! {
        title => TITLE,
        genders => &options.genders,
        contracts => contracts,
        payment_methods => &options.payment_methods,
        senior => senior,
        rows => rows,
    })
}
