use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Write a synthetic Telco-style churn dataset
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output file; a .parquet extension writes Parquet, anything else CSV
    #[arg(default_value = "churn.csv")]
    output: PathBuf,

    /// Number of customers to generate
    #[arg(short = 'n', long, default_value_t = 7043)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for &(value, weight) in choices {
            if target < weight {
                return value;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const HEADERS: [&str; 21] = [
    "customerID",
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "Churn",
];

/// One synthetic customer, already in the raw dataset's text encoding.
struct Customer {
    id: String,
    gender: &'static str,
    senior: i64,
    partner: &'static str,
    dependents: &'static str,
    tenure: i64,
    phone: &'static str,
    multiple_lines: &'static str,
    internet: &'static str,
    services: [&'static str; 6],
    contract: &'static str,
    paperless: &'static str,
    payment: &'static str,
    monthly: f64,
    /// Blank for brand-new customers, as in the public Telco file.
    total: String,
    churn: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn generate_customer(i: usize, rng: &mut SimpleRng) -> Customer {
    let contract = rng.weighted(&[
        ("Month-to-month", 0.55),
        ("One year", 0.21),
        ("Two year", 0.24),
    ]);
    let tenure = match contract {
        "Month-to-month" => (rng.next_f64().powi(2) * 73.0) as i64,
        "One year" => (rng.next_f64() * 73.0) as i64,
        _ => (rng.next_f64().sqrt() * 73.0) as i64,
    }
    .min(72);

    let senior = rng.chance(0.16);
    let phone = rng.chance(0.9);
    let multiple_lines = if phone {
        yes_no(rng.chance(0.47))
    } else {
        "No phone service"
    };
    let internet = rng.weighted(&[("DSL", 0.34), ("Fiber optic", 0.44), ("No", 0.22)]);

    let mut services = ["No internet service"; 6];
    let mut monthly = if phone { 20.0 } else { 0.0 };
    match internet {
        "DSL" => monthly += 25.0,
        "Fiber optic" => monthly += 50.0,
        _ => {}
    }
    if internet != "No" {
        for slot in &mut services {
            let has = rng.chance(0.4);
            *slot = yes_no(has);
            if has {
                monthly += 5.0;
            }
        }
    }
    let monthly = ((monthly + rng.gauss(0.0, 2.0)).max(18.25) * 20.0).round() / 20.0;

    let payment = rng.weighted(&[
        ("Electronic check", 0.34),
        ("Mailed check", 0.23),
        ("Bank transfer (automatic)", 0.22),
        ("Credit card (automatic)", 0.21),
    ]);

    let mut p_churn: f64 = match contract {
        "Month-to-month" => 0.42,
        "One year" => 0.11,
        _ => 0.03,
    };
    if internet == "Fiber optic" {
        p_churn += 0.1;
    }
    if senior {
        p_churn += 0.08;
    }
    if payment == "Electronic check" {
        p_churn += 0.05;
    }
    p_churn *= 1.0 - tenure as f64 / 120.0;
    let churn = yes_no(rng.chance(p_churn.clamp(0.0, 0.95)));

    let total = if tenure == 0 {
        " ".to_string()
    } else {
        let drift = rng.gauss(1.0, 0.03).max(0.8);
        format!("{:.2}", monthly * tenure as f64 * drift)
    };

    Customer {
        id: format!("{:04}-SYN{:05}", i % 10_000, i),
        gender: gender_of(rng.chance(0.5)),
        senior: i64::from(senior),
        partner: yes_no(rng.chance(0.48)),
        dependents: yes_no(rng.chance(0.3)),
        tenure,
        phone: yes_no(phone),
        multiple_lines,
        internet,
        services,
        contract,
        paperless: yes_no(rng.chance(0.59)),
        payment,
        monthly,
        total,
        churn,
    }
}

fn gender_of(female: bool) -> &'static str {
    if female {
        "Female"
    } else {
        "Male"
    }
}

impl Customer {
    fn text_fields(&self) -> Vec<String> {
        let mut out = vec![
            self.id.clone(),
            self.gender.to_string(),
            self.senior.to_string(),
            self.partner.to_string(),
            self.dependents.to_string(),
            self.tenure.to_string(),
            self.phone.to_string(),
            self.multiple_lines.to_string(),
            self.internet.to_string(),
        ];
        out.extend(self.services.iter().map(|s| s.to_string()));
        out.extend([
            self.contract.to_string(),
            self.paperless.to_string(),
            self.payment.to_string(),
            format!("{:.2}", self.monthly),
            self.total.clone(),
            self.churn.to_string(),
        ]);
        out
    }
}

fn write_csv(path: &Path, customers: &[Customer]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(HEADERS)?;
    for c in customers {
        writer.write_record(c.text_fields())?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, customers: &[Customer]) -> Result<()> {
    // Integer and float columns get native types; everything else stays text
    // (TotalCharges included, to keep its blanks).
    let mut fields = Vec::with_capacity(HEADERS.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(HEADERS.len());
    for (col, name) in HEADERS.iter().enumerate() {
        match *name {
            "SeniorCitizen" => {
                fields.push(Field::new(*name, DataType::Int64, false));
                columns.push(Arc::new(Int64Array::from_iter_values(
                    customers.iter().map(|c| c.senior),
                )));
            }
            "tenure" => {
                fields.push(Field::new(*name, DataType::Int64, false));
                columns.push(Arc::new(Int64Array::from_iter_values(
                    customers.iter().map(|c| c.tenure),
                )));
            }
            "MonthlyCharges" => {
                fields.push(Field::new(*name, DataType::Float64, false));
                columns.push(Arc::new(Float64Array::from_iter_values(
                    customers.iter().map(|c| c.monthly),
                )));
            }
            _ => {
                fields.push(Field::new(*name, DataType::Utf8, false));
                let values: Vec<String> = customers
                    .iter()
                    .map(|c| c.text_fields().swap_remove(col))
                    .collect();
                columns.push(Arc::new(StringArray::from(values)));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_path = cli.output.as_path();

    let mut rng = SimpleRng::new(cli.seed);
    let customers: Vec<Customer> = (0..cli.rows)
        .map(|i| generate_customer(i, &mut rng))
        .collect();

    let is_parquet = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(output_path, &customers)?;
    } else {
        write_csv(output_path, &customers)?;
    }

    let churned = customers.iter().filter(|c| c.churn == "Yes").count();
    let blank = customers.iter().filter(|c| c.tenure == 0).count();
    println!(
        "Wrote {} customers ({churned} churned, {blank} with blank TotalCharges) to {}",
        customers.len(),
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_dataset_size() {
        let cli = Cli::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("churn.csv"));
        assert_eq!(cli.rows, 7043);
        assert_eq!(cli.seed, 42);
    }

    #[test]
    fn output_rows_and_seed_are_configurable() {
        let cli = Cli::try_parse_from(["generate_sample", "out.parquet", "-n", "10", "--seed", "7"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("out.parquet"));
        assert_eq!(cli.rows, 10);
        assert_eq!(cli.seed, 7);
    }

    #[test]
    fn same_seed_generates_the_same_customers() {
        let draw = |seed| {
            let mut rng = SimpleRng::new(seed);
            (0..20)
                .map(|i| generate_customer(i, &mut rng).text_fields())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
        assert!(draw(42).iter().all(|fields| fields.len() == HEADERS.len()));
    }
}
