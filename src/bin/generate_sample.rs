//! Writes `sample_stations.parquet`: observed stations scattered around a few
//! cities plus yearly model suggestions, in the column layout the viewer reads.

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct City {
    name: &'static str,
    state: &'static str,
    lat: f64,
    lon: f64,
    /// Number of observed stations to scatter around the center.
    stations: usize,
}

const CITIES: [City; 5] = [
    City { name: "Atlanta", state: "GA", lat: 33.749, lon: -84.388, stations: 120 },
    City { name: "Macon", state: "GA", lat: 32.840, lon: -83.632, stations: 25 },
    City { name: "Savannah", state: "GA", lat: 32.081, lon: -81.091, stations: 30 },
    City { name: "Charlotte", state: "NC", lat: 35.227, lon: -80.843, stations: 60 },
    City { name: "Jacksonville", state: "FL", lat: 30.332, lon: -81.656, stations: 45 },
];

const ALGORITHMS: [&str; 3] = ["Frank", "Noah_C", "Noah_S"];
const STREETS: [&str; 6] = ["Peachtree St", "Main St", "Oak Ave", "Market St", "Broad St", "Park Rd"];

#[derive(Default)]
struct Columns {
    name: Vec<String>,
    address: Vec<String>,
    city: Vec<&'static str>,
    state: Vec<&'static str>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    open_date: Vec<Option<String>>,
    year: Vec<i64>,
    algorithm: Vec<&'static str>,
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let mut cols = Columns::default();

    // Observed stations: opened between 2010 and 2024.
    for city in &CITIES {
        for i in 0..city.stations {
            let year = 2010 + rng.below(15) as i64;
            let month = 1 + rng.below(12);
            let day = 1 + rng.below(28);
            cols.name.push(format!("{} Charging #{}", city.name, i + 1));
            cols.address.push(format!(
                "{} {}",
                100 + rng.below(9900),
                STREETS[rng.below(STREETS.len() as u64) as usize]
            ));
            cols.city.push(city.name);
            cols.state.push(city.state);
            cols.lat.push(rng.gauss(city.lat, 0.06));
            cols.lon.push(rng.gauss(city.lon, 0.06));
            cols.open_date.push(Some(format!("{year}-{month:02}-{day:02}")));
            cols.year.push(year);
            cols.algorithm.push("Original");
        }
    }

    // Suggested sites: one per algorithm, city and year.
    let mut suggestions = 0;
    for year in 2015..=2024i64 {
        for city in &CITIES {
            for algorithm in ALGORITHMS {
                cols.name.push(format!("{algorithm} suggestion"));
                cols.address.push(String::new());
                cols.city.push(city.name);
                cols.state.push(city.state);
                cols.lat.push(rng.gauss(city.lat, 0.04));
                cols.lon.push(rng.gauss(city.lon, 0.04));
                cols.open_date.push(None);
                cols.year.push(year);
                cols.algorithm.push(algorithm);
                suggestions += 1;
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Station Name", DataType::Utf8, false),
        Field::new("Street Address", DataType::Utf8, false),
        Field::new("City", DataType::Utf8, false),
        Field::new("State", DataType::Utf8, false),
        Field::new("Latitude", DataType::Float64, false),
        Field::new("Longitude", DataType::Float64, false),
        Field::new("Open Date", DataType::Utf8, true),
        Field::new("Year", DataType::Int64, false),
        Field::new("Algorithm", DataType::Utf8, false),
    ]));

    let rows = cols.lat.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(cols.name)),
            Arc::new(StringArray::from(cols.address)),
            Arc::new(StringArray::from(cols.city)),
            Arc::new(StringArray::from(cols.state)),
            Arc::new(Float64Array::from(cols.lat)),
            Arc::new(Float64Array::from(cols.lon)),
            Arc::new(StringArray::from(cols.open_date)),
            Arc::new(Int64Array::from(cols.year)),
            Arc::new(StringArray::from(cols.algorithm)),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_stations.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {rows} rows ({} observed, {suggestions} suggestions) to {output_path}",
        rows - suggestions
    );
}
