use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const STATES: [&str; 8] = [
    "Bihar",
    "Goa",
    "Kerala",
    "Maharashtra",
    "Punjab",
    "Rajasthan",
    "Tamil Nadu",
    "Uttar Pradesh",
];

const AREAS: [&str; 3] = ["Urban", "Rural", "Total"];

/// Indicator name, national baseline (%), spread across states (%).
const INDICATORS: [(&str, f64, f64); 5] = [
    ("Households with electricity (%)", 88.0, 8.0),
    ("Women who are literate (%)", 68.0, 12.0),
    ("Institutional births (%)", 79.0, 10.0),
    ("Children under 5 years who are stunted (%)", 38.0, 7.0),
    ("Children age 12-23 months fully immunized (%)", 62.0, 11.0),
];

struct Survey {
    states: Vec<String>,
    areas: Vec<String>,
    households: Vec<i64>,
    indicators: Vec<Vec<Option<f64>>>,
}

fn generate(rng: &mut SimpleRng) -> Survey {
    let mut survey = Survey {
        states: Vec::new(),
        areas: Vec::new(),
        households: Vec::new(),
        indicators: vec![Vec::new(); INDICATORS.len()],
    };

    for state in STATES {
        // Each state sits consistently above or below the national baseline.
        let offset = rng.gauss(0.0, 1.0);
        for (area_idx, area) in AREAS.iter().enumerate() {
            let urban_bonus = match area_idx {
                0 => 6.0,
                1 => -4.0,
                _ => 0.0,
            };
            survey.states.push(state.to_string());
            survey.areas.push(area.to_string());
            survey
                .households
                .push((rng.next_f64() * 20_000.0) as i64 + 5_000);

            for (i, &(_, base, spread)) in INDICATORS.iter().enumerate() {
                // Roughly one cell in twenty is not reported.
                if rng.next_f64() < 0.05 {
                    survey.indicators[i].push(None);
                    continue;
                }
                let sign = if i == 3 { -1.0 } else { 1.0 };
                let value = base + sign * (offset * spread + urban_bonus) + rng.gauss(0.0, 2.0);
                survey.indicators[i].push(Some((value.clamp(0.0, 100.0) * 10.0).round() / 10.0));
            }
        }
    }
    survey
}

fn write_parquet(survey: &Survey, output_path: &str) -> Result<()> {
    let mut fields = vec![
        Field::new("State/UT", DataType::Utf8, false),
        Field::new("Area", DataType::Utf8, false),
        Field::new("Number of households surveyed", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(survey.states.clone())),
        Arc::new(StringArray::from(survey.areas.clone())),
        Arc::new(Int64Array::from(survey.households.clone())),
    ];
    for (i, (name, _, _)) in INDICATORS.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(survey.indicators[i].clone())));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(output_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(survey: &Survey, output_path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path).context("creating CSV output")?;

    let mut header = vec![
        "State/UT".to_string(),
        "Area".to_string(),
        "Number of households surveyed".to_string(),
    ];
    header.extend(INDICATORS.iter().map(|(name, _, _)| name.to_string()));
    writer.write_record(&header)?;

    for row in 0..survey.states.len() {
        let mut record = vec![
            survey.states[row].clone(),
            survey.areas[row].clone(),
            survey.households[row].to_string(),
        ];
        record.extend(
            survey
                .indicators
                .iter()
                .map(|col| col[row].map(|v| format!("{v:.1}")).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let survey = generate(&mut rng);

    write_parquet(&survey, "sample_survey.parquet")?;
    write_csv(&survey, "sample_survey.csv")?;

    println!(
        "Wrote {} rows ({} states x {} areas) to sample_survey.parquet and sample_survey.csv",
        survey.states.len(),
        STATES.len(),
        AREAS.len()
    );
    Ok(())
}
