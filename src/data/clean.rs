use std::ops::RangeInclusive;

use super::loader::RawTable;
use super::model::{
    Dataset, RawValue, Record, CHURN, CONTRACT, GENDER, MONTHLY_CHARGES, PAYMENT_METHOD,
    SENIOR_CITIZEN, SERVICE_COLUMNS, TENURE, TOTAL_CHARGES,
};
use crate::error::{LoadError, LoadResult};

/// Raw service values that count as "has the service".
pub const SERVICE_POSITIVE_VALUES: [&str; 3] = ["Yes", "DSL", "Fiber optic"];

/// Binarize one service cell.  Exact, case-sensitive match.
pub fn binarize_service(value: &RawValue) -> u8 {
    match value {
        RawValue::Text(s) if SERVICE_POSITIVE_VALUES.contains(&s.as_str()) => 1,
        _ => 0,
    }
}

/// Accepted tenure in months; anything outside is a malformed cell.
pub const TENURE_MONTHS: RangeInclusive<i64> = 0..=1200;

static NULL: RawValue = RawValue::Null;

/// Resolved column positions for one table.
struct Columns {
    gender: usize,
    senior_citizen: usize,
    contract: usize,
    payment_method: usize,
    tenure: usize,
    monthly_charges: usize,
    total_charges: usize,
    churn: usize,
    services: [usize; 6],
}

impl Columns {
    /// One lookup per column, in [`REQUIRED_COLUMNS`](super::model::REQUIRED_COLUMNS) order, so the first
    /// missing column reported is stable.
    fn resolve(table: &RawTable) -> LoadResult<Self> {
        let gender = table.column_index(GENDER)?;
        let senior_citizen = table.column_index(SENIOR_CITIZEN)?;
        let contract = table.column_index(CONTRACT)?;
        let payment_method = table.column_index(PAYMENT_METHOD)?;
        let tenure = table.column_index(TENURE)?;
        let monthly_charges = table.column_index(MONTHLY_CHARGES)?;
        let total_charges = table.column_index(TOTAL_CHARGES)?;
        let churn = table.column_index(CHURN)?;
        let mut services = [0; 6];
        for (slot, name) in services.iter_mut().zip(SERVICE_COLUMNS) {
            *slot = table.column_index(name)?;
        }
        Ok(Columns {
            gender,
            senior_citizen,
            contract,
            payment_method,
            tenure,
            monthly_charges,
            total_charges,
            churn,
            services,
        })
    }
}

/// Turn a parsed table into a [`Dataset`].
///
/// Rows whose `TotalCharges` does not coerce to a number are dropped (and
/// logged).  Any other malformed typed cell aborts the load.
pub fn clean(table: &RawTable) -> LoadResult<Dataset> {
    let cols = Columns::resolve(table)?;
    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for (index, row) in table.rows.iter().enumerate() {
        // 1-based data row, header excluded.
        let row_no = index + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&NULL);

        let Some(total_charges) = cell(cols.total_charges).as_f64() else {
            log::debug!(
                "Dropping row {row_no}: TotalCharges '{}' is not numeric",
                cell(cols.total_charges)
            );
            dropped += 1;
            continue;
        };

        let senior_citizen = match cell(cols.senior_citizen).as_i64() {
            Some(v @ (0 | 1)) => v as u8,
            _ => return Err(invalid(row_no, SENIOR_CITIZEN, cell(cols.senior_citizen))),
        };
        let tenure = cell(cols.tenure)
            .as_i64()
            .filter(|t| TENURE_MONTHS.contains(t))
            .ok_or_else(|| invalid(row_no, TENURE, cell(cols.tenure)))?;
        let monthly_charges = cell(cols.monthly_charges)
            .as_f64()
            .ok_or_else(|| invalid(row_no, MONTHLY_CHARGES, cell(cols.monthly_charges)))?;

        let mut services = [0u8; 6];
        for (flag, &idx) in services.iter_mut().zip(&cols.services) {
            *flag = binarize_service(cell(idx));
        }

        records.push(Record {
            gender: cell(cols.gender).as_text(),
            senior_citizen,
            contract: cell(cols.contract).as_text(),
            payment_method: cell(cols.payment_method).as_text(),
            tenure,
            monthly_charges,
            total_charges,
            churn: cell(cols.churn).as_text(),
            services,
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} row(s) with a non-numeric TotalCharges");
    }

    Ok(Dataset::from_records(records, dropped))
}

fn invalid(row: usize, column: &'static str, value: &RawValue) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_delimited;
    use crate::data::model::REQUIRED_COLUMNS;

    const HEADER: &str = "gender,SeniorCitizen,Contract,PaymentMethod,tenure,MonthlyCharges,TotalCharges,Churn,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies";

    fn table(rows: &[&str]) -> RawTable {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        read_delimited(text.as_bytes(), b',').unwrap()
    }

    #[test]
    fn binarization_accepts_only_the_three_positive_values() {
        for v in ["Yes", "DSL", "Fiber optic"] {
            assert_eq!(binarize_service(&RawValue::Text(v.into())), 1, "{v}");
        }
        for v in ["No", "No internet service", "No phone service", "yes", "DSL "] {
            assert_eq!(binarize_service(&RawValue::Text(v.into())), 0, "{v}");
        }
        assert_eq!(binarize_service(&RawValue::Null), 0);
        assert_eq!(binarize_service(&RawValue::Integer(1)), 0);
    }

    #[test]
    fn rows_with_unparseable_total_charges_are_dropped() {
        let t = table(&[
            "Female,0,Month-to-month,Electronic check,1,29.85,29.85,No,No,Yes,No,No,No,No",
            "Male,0,Two year,Mailed check,0,20.25, ,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service",
            "Male,1,One year,Bank transfer (automatic),0,19.85,,Yes,No,No,No,No,No,No",
        ]);
        let ds = clean(&t).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows(), 2);
        let rec = &ds.records()[0];
        assert_eq!(rec.gender, "Female");
        assert_eq!(rec.total_charges, 29.85);
        assert_eq!(rec.services, [0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let t = read_delimited("gender,tenure\nMale,1\n".as_bytes(), b',').unwrap();
        let err = clean(&t).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "SeniorCitizen"));
    }

    #[test]
    fn each_required_column_is_reported_when_absent() {
        for missing in REQUIRED_COLUMNS {
            let headers: Vec<&str> = REQUIRED_COLUMNS.into_iter().filter(|c| *c != missing).collect();
            let t = read_delimited(headers.join(",").as_bytes(), b',').unwrap();
            let err = clean(&t).unwrap_err();
            assert!(matches!(err, LoadError::MissingColumn(ref c) if c == missing), "{missing}");
        }
    }

    #[test]
    fn shuffled_columns_resolve_by_name() {
        let t = read_delimited(
            "StreamingMovies,Churn,TotalCharges,MonthlyCharges,tenure,PaymentMethod,Contract,SeniorCitizen,gender,StreamingTV,TechSupport,DeviceProtection,OnlineBackup,OnlineSecurity\n\
             Yes,No,100.0,50.0,2,Mailed check,One year,1,Male,No,No,No,No,Yes\n"
                .as_bytes(),
            b',',
        )
        .unwrap();
        let binding = clean(&t).unwrap();
        let rec = &binding.records()[0];
        assert_eq!(rec.gender, "Male");
        assert_eq!(rec.tenure, 2);
        assert_eq!(rec.senior_citizen, 1);
        assert_eq!(rec.services, [1, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn malformed_tenure_is_a_load_error() {
        let t = table(&["Female,0,Month-to-month,Electronic check,abc,29.85,29.85,No,No,No,No,No,No,No"]);
        let err = clean(&t).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { row: 1, column: "tenure", .. }
        ));
    }

    #[test]
    fn tenure_outside_the_month_range_is_rejected() {
        for tenure in ["9223372036854775807", "1e300", "-1", "1201"] {
            let bad = format!("Male,0,One year,Mailed check,{tenure},50.0,500.0,No,No,No,No,No,No,No");
            let t = table(&[
                "Female,0,Month-to-month,Electronic check,1,29.85,29.85,No,No,No,No,No,No,No",
                bad.as_str(),
            ]);
            let err = clean(&t).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidValue { row: 2, column: "tenure", .. }),
                "{tenure}: {err}"
            );
        }
        let t = table(&["Male,0,Two year,Mailed check,1200,50.0,60000.0,No,No,No,No,No,No,No"]);
        assert_eq!(clean(&t).unwrap().records()[0].tenure, 1200);
    }

    #[test]
    fn error_message_names_the_data_row() {
        let t = table(&["Female,0,Month-to-month,Electronic check,abc,29.85,29.85,No,No,No,No,No,No,No"]);
        let msg = clean(&t).unwrap_err().to_string();
        assert!(msg.contains("data row 1"), "{msg}");
        assert!(msg.contains("'abc'"), "{msg}");
    }

    #[test]
    fn senior_flag_outside_zero_one_is_rejected() {
        let t = table(&["Female,2,Month-to-month,Electronic check,1,29.85,29.85,No,No,No,No,No,No,No"]);
        assert!(matches!(
            clean(&t).unwrap_err(),
            LoadError::InvalidValue { column: "SeniorCitizen", .. }
        ));
    }

    #[test]
    fn header_only_file_loads_empty() {
        let ds = clean(&table(&[])).unwrap();
        assert!(ds.is_empty());
        assert!(ds.options().contracts.is_empty());
    }
}
