//! Compression statistics and model evaluation.
//!
//! [`CompressionStats`] accumulates sizes and timings for one named model
//! across several inputs; [`StatsTable`] collects them by name and renders
//! the comparison table. [`evaluate`] round-trips an input through a list
//! of [`ModelSpec`]s.
//!
//! Rates are in bits per byte and speeds in kB/s of original data.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::ModelSpec;
use crate::error::Result;
use crate::stream::{compress, decompress};

/// Timings shorter than this are rounded up before computing speeds.
const MIN_TIMING: Duration = Duration::from_micros(1);

fn kilobytes_per_second(bytes: u64, elapsed: Duration) -> f64 {
    bytes as f64 / 1000.0 / elapsed.max(MIN_TIMING).as_secs_f64()
}

fn bits_per_byte(coded: u64, original: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        8.0 * coded as f64 / original as f64
    }
}

/// Accumulated results of one model over several inputs.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    name: String,
    tests: u32,
    original_bytes: u64,
    coded_bytes: u64,
    encode_time: Duration,
    decode_time: Duration,
    /// Sums of per-test rates, for the averages
    rate_sum: f64,
    encode_speed_sum: f64,
    decode_speed_sum: f64,
}

impl CompressionStats {
    /// Empty statistics for the model called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of recorded tests.
    pub fn tests(&self) -> u32 {
        self.tests
    }

    /// Record one coded input.
    pub fn record(
        &mut self,
        original_bytes: u64,
        coded_bytes: u64,
        encode_time: Duration,
        decode_time: Duration,
    ) {
        self.tests += 1;
        self.original_bytes += original_bytes;
        self.coded_bytes += coded_bytes;
        self.encode_time += encode_time;
        self.decode_time += decode_time;
        self.rate_sum += bits_per_byte(coded_bytes, original_bytes);
        self.encode_speed_sum += kilobytes_per_second(original_bytes, encode_time);
        self.decode_speed_sum += kilobytes_per_second(original_bytes, decode_time);
    }

    /// Overall rate: total coded bits over total original bytes.
    pub fn bits_per_byte(&self) -> f64 {
        bits_per_byte(self.coded_bytes, self.original_bytes)
    }

    /// Mean of the per-test rates.
    pub fn average_bits_per_byte(&self) -> f64 {
        self.average(self.rate_sum)
    }

    /// Overall encode speed.
    pub fn encode_speed(&self) -> f64 {
        kilobytes_per_second(self.original_bytes, self.encode_time)
    }

    /// Overall decode speed.
    pub fn decode_speed(&self) -> f64 {
        kilobytes_per_second(self.original_bytes, self.decode_time)
    }

    /// Mean of the per-test encode speeds.
    pub fn average_encode_speed(&self) -> f64 {
        self.average(self.encode_speed_sum)
    }

    /// Mean of the per-test decode speeds.
    pub fn average_decode_speed(&self) -> f64 {
        self.average(self.decode_speed_sum)
    }

    fn average(&self, sum: f64) -> f64 {
        if self.tests == 0 {
            0.0
        } else {
            sum / f64::from(self.tests)
        }
    }

    /// One table row: name, then overall and average rate and speeds.
    pub fn line_report(&self) -> String {
        format!(
            "{:<10}{:>8.2}{:>8.0}{:>8.0}{:>8.2}{:>8.0}{:>8.0}",
            self.name,
            self.bits_per_byte(),
            self.encode_speed(),
            self.decode_speed(),
            self.average_bits_per_byte(),
            self.average_encode_speed(),
            self.average_decode_speed(),
        )
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TEST: {}", self.name)?;
        writeln!(f, "Overall Compression Rate {:>8.2} b/B", self.bits_per_byte())?;
        writeln!(f, "Overall Encode Speed     {:>8.2} kB/s", self.encode_speed())?;
        writeln!(f, "Overall Decode Speed     {:>8.2} kB/s", self.decode_speed())?;
        writeln!(f, "Average Compression Rate {:>8.2} b/B", self.average_bits_per_byte())?;
        writeln!(f, "Average Encode Speed     {:>8.2} kB/s", self.average_encode_speed())?;
        write!(f, "Average Decode Speed     {:>8.2} kB/s", self.average_decode_speed())
    }
}

/// Best average rate first, then by name.
impl Ord for CompressionStats {
    fn cmp(&self, other: &Self) -> Ordering {
        self.average_bits_per_byte()
            .total_cmp(&other.average_bits_per_byte())
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for CompressionStats {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CompressionStats {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CompressionStats {}

/// Statistics for several models, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    stats: HashMap<String, CompressionStats>,
}

impl StatsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one coded input for the model called `name`.
    pub fn record(
        &mut self,
        name: &str,
        original_bytes: u64,
        coded_bytes: u64,
        encode_time: Duration,
        decode_time: Duration,
    ) {
        self.stats
            .entry(name.to_string())
            .or_insert_with(|| CompressionStats::new(name))
            .record(original_bytes, coded_bytes, encode_time, decode_time);
    }

    /// Record an [`Evaluation`] under its model's name.
    pub fn record_evaluation(&mut self, evaluation: &Evaluation) {
        self.record(
            &evaluation.spec.to_string(),
            evaluation.original_bytes as u64,
            evaluation.coded_bytes as u64,
            evaluation.encode_time,
            evaluation.decode_time,
        );
    }

    /// Statistics for `name`, if any were recorded.
    pub fn get(&self, name: &str) -> Option<&CompressionStats> {
        self.stats.get(name)
    }

    /// All statistics, best first.
    pub fn sorted(&self) -> Vec<&CompressionStats> {
        let mut rows: Vec<_> = self.stats.values().collect();
        rows.sort();
        rows
    }

    /// Number of models recorded.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Forget every recorded result.
    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "                    TOTAL                   AVERAGE")?;
        writeln!(f, "NAME         b/B  Encode  Decode     b/B  Encode  Decode")?;
        write!(f, "{}", "-".repeat(58))?;
        for row in self.sorted() {
            write!(f, "\n{}", row.line_report())?;
        }
        Ok(())
    }
}

/// Outcome of round-tripping one input through one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Model used on both sides.
    pub spec: ModelSpec,
    /// Input size.
    pub original_bytes: usize,
    /// Coded size.
    pub coded_bytes: usize,
    /// Time spent encoding.
    pub encode_time: Duration,
    /// Time spent decoding.
    pub decode_time: Duration,
    /// Whether the decoded bytes matched the input.
    pub exact: bool,
}

impl Evaluation {
    /// Coded bits per input byte.
    pub fn bits_per_byte(&self) -> f64 {
        bits_per_byte(self.coded_bytes as u64, self.original_bytes as u64)
    }
}

/// Round-trip `data` through a fresh encoder and decoder built from `spec`.
pub fn evaluate_one(data: &[u8], spec: ModelSpec) -> Result<Evaluation> {
    let start = Instant::now();
    let coded = compress(data, spec.build())?;
    let encode_time = start.elapsed();

    let start = Instant::now();
    let decoded = decompress(&coded, spec.build())?;
    let decode_time = start.elapsed();

    Ok(Evaluation {
        spec,
        original_bytes: data.len(),
        coded_bytes: coded.len(),
        encode_time,
        decode_time,
        exact: decoded == data,
    })
}

/// Round-trip `data` through every spec, in order.
///
/// With the `parallel` feature the specs run concurrently; each builds its
/// own models, so nothing is shared between them.
pub fn evaluate(data: &[u8], specs: &[ModelSpec]) -> Result<Vec<Evaluation>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        specs
            .par_iter()
            .map(|&spec| evaluate_one(data, spec))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        specs.iter().map(|&spec| evaluate_one(data, spec)).collect()
    }
}
