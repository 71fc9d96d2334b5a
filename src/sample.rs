use std::io;

use crate::check::{NYC_LATITUDE, NYC_LONGITUDE};
use crate::schema::NYC_311_COLUMNS;

const AGENCIES: [(&str, &str, &[&str]); 4] = [
    (
        "NYPD",
        "New York City Police Department",
        &["Noise - Residential", "Illegal Parking", "Blocked Driveway"],
    ),
    (
        "HPD",
        "Department of Housing Preservation and Development",
        &["HEAT/HOT WATER", "PLUMBING", "PAINT/PLASTER"],
    ),
    (
        "DSNY",
        "Department of Sanitation",
        &["Dirty Condition", "Missed Collection"],
    ),
    (
        "DOT",
        "Department of Transportation",
        &["Street Condition", "Street Light Condition"],
    ),
];

const BOROUGHS: [&str; 5] = ["MANHATTAN", "BROOKLYN", "QUEENS", "BRONX", "STATEN ISLAND"];

/// Spread of generated coordinates around the city reference point.
const COORD_SIGMA: f64 = 0.05;
/// Share of rows written without coordinates.
const MISSING_COORD_RATE: f64 = 0.02;

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
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

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn timestamp(rng: &mut SimpleRng) -> String {
    let day = 1 + rng.below(31);
    let hour = 1 + rng.below(12);
    let minute = rng.below(60);
    let second = rng.below(60);
    let meridiem = if rng.below(2) == 0 { "AM" } else { "PM" };
    format!("01/{day:02}/2022 {hour:02}:{minute:02}:{second:02} {meridiem}")
}

/// Build one synthetic service request, one field per header column.
fn sample_record(rng: &mut SimpleRng, key: u64) -> Vec<String> {
    let (agency, agency_name, complaints) = *rng.pick(&AGENCIES);
    let complaint = *rng.pick(complaints);
    let borough = *rng.pick(&BOROUGHS);
    let created = timestamp(rng);
    let zip = 10001 + rng.below(400);

    let coords = if rng.next_f64() < MISSING_COORD_RATE {
        None
    } else {
        Some((
            rng.gauss(NYC_LATITUDE, COORD_SIGMA),
            rng.gauss(NYC_LONGITUDE, COORD_SIGMA),
        ))
    };

    NYC_311_COLUMNS
        .iter()
        .map(|col| match (*col, coords) {
            ("Unique Key", _) => key.to_string(),
            ("Created Date", _) => created.clone(),
            ("Agency", _) => agency.to_string(),
            ("Agency Name", _) => agency_name.to_string(),
            ("Complaint Type", _) => complaint.to_string(),
            ("Incident Zip", _) => zip.to_string(),
            ("City", _) | ("Borough", _) | ("Park Borough", _) => borough.to_string(),
            ("Status", _) => "Open".to_string(),
            ("Open Data Channel Type", _) => "ONLINE".to_string(),
            ("Park Facility Name", _) => "Unspecified".to_string(),
            ("Latitude", Some((lat, _))) => format!("{lat:.8}"),
            ("Longitude", Some((_, lng))) => format!("{lng:.8}"),
            ("Location", Some((lat, lng))) => format!("({lat:.8}, {lng:.8})"),
            _ => String::new(),
        })
        .collect()
}

/// Write `rows` synthetic 311 requests as CSV, header included.
pub fn write_sample_csv<W: io::Write>(out: W, rows: usize, seed: u64) -> Result<(), csv::Error> {
    let mut rng = SimpleRng::new(seed);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(NYC_311_COLUMNS)?;

    for i in 0..rows {
        writer.write_record(sample_record(&mut rng, 52_000_000 + i as u64))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    #[test]
    fn same_seed_same_output() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_sample_csv(&mut a, 20, 7).unwrap();
        write_sample_csv(&mut b, 20, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sample_has_full_header() {
        let mut buf = Vec::new();
        write_sample_csv(&mut buf, 10, 42).unwrap();
        let ds = read_csv(buf.as_slice()).unwrap();
        assert_eq!(ds.num_columns(), 41);
        assert_eq!(ds.num_rows(), 10);
    }

    #[test]
    fn gauss_is_centred() {
        let mut rng = SimpleRng::new(1);
        let n = 10_000;
        let mean: f64 = (0..n).map(|_| rng.gauss(5.0, 1.0)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.1);
    }
}
