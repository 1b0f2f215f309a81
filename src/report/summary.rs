use std::fmt;

use hdrhistogram::Histogram;

use crate::dispatch::is_failure_status;
use crate::error::ReportError;
use crate::scenario::ScenarioReport;
use crate::sinks::ScenarioRecord;

const MICROS_PER_MS: f64 = 1_000.0;
/// One hour, in microseconds.
const HISTOGRAM_MAX_US: u64 = 3_600_000_000;
const HISTOGRAM_SIGFIG: u8 = 3;

/// Index-aligned latencies of one scenario; `None` marks a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSeries {
    pub name: String,
    pub latencies: Vec<Option<f64>>,
}

impl ScenarioSeries {
    /// Series of a finished run. Positions follow ascending request index.
    #[must_use]
    pub fn from_report(report: &ScenarioReport) -> Self {
        let mut latencies: Vec<Option<f64>> = report.series.iter().copied().map(Some).collect();
        for failure in &report.failures {
            if let Some(slot) = latencies.get_mut(failure.index) {
                *slot = None;
            }
        }
        Self {
            name: report.scenario.to_string(),
            latencies,
        }
    }

    /// Series read back from a result file; non-2xx rows and rows without a
    /// response (status 0) are failures.
    ///
    /// Each record lands at its request index, so a file missing rows (an
    /// interrupted run) leaves `None` gaps instead of shifting later rows.
    /// A repeated index keeps the last row.
    #[must_use]
    pub fn from_records(name: String, records: &[ScenarioRecord]) -> Self {
        let len = records
            .iter()
            .map(|record| record.index.saturating_add(1))
            .max()
            .unwrap_or(0);
        let mut latencies = vec![None; len];
        for record in records {
            if let Some(slot) = latencies.get_mut(record.index) {
                *slot = (!is_failure_status(record.status_code)).then_some(record.elapsed_ms);
            }
        }
        Self { name, latencies }
    }

    /// Values as plotted and persisted: failures are zero.
    pub fn plotted(&self) -> impl Iterator<Item = f64> + '_ {
        self.latencies.iter().map(|value| value.unwrap_or(0.0))
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.latencies.iter().filter(|value| value.is_none()).count()
    }
}

/// Latency distribution over the successful requests of a scenario, in ms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub count: u64,
    pub min: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

impl LatencyStats {
    /// Summarizes `latencies` at microsecond resolution. Returns `None` when
    /// there is no successful request.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram cannot be built or a value cannot
    /// be recorded.
    pub fn from_latencies<I>(latencies: I) -> Result<Option<Self>, ReportError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut hist = Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_US, HISTOGRAM_SIGFIG)
            .map_err(|err| ReportError::Histogram {
                message: format!("Failed to create histogram: {}", err),
            })?;
        for latency_ms in latencies {
            hist.record(ms_to_us(latency_ms))
                .map_err(|err| ReportError::Histogram {
                    message: format!("Failed to record latency {}ms: {}", latency_ms, err),
                })?;
        }
        if hist.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            count: hist.len(),
            min: us_to_ms(hist.min()),
            mean: hist.mean() / MICROS_PER_MS,
            p50: us_to_ms(hist.value_at_quantile(0.5)),
            p90: us_to_ms(hist.value_at_quantile(0.9)),
            p99: us_to_ms(hist.value_at_quantile(0.99)),
            max: us_to_ms(hist.max()),
        }))
    }
}

fn ms_to_us(latency_ms: f64) -> u64 {
    let micros = (latency_ms * MICROS_PER_MS).round();
    if micros.is_finite() && micros >= 1.0 {
        (micros as u64).min(HISTOGRAM_MAX_US)
    } else {
        1
    }
}

fn us_to_ms(micros: u64) -> f64 {
    micros as f64 / MICROS_PER_MS
}

/// Totals and distribution of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub name: String,
    pub total: usize,
    pub failures: usize,
    pub stats: Option<LatencyStats>,
}

impl ScenarioSummary {
    /// # Errors
    ///
    /// Returns an error when the latency histogram fails.
    pub fn from_series(series: &ScenarioSeries) -> Result<Self, ReportError> {
        Ok(Self {
            name: series.name.clone(),
            total: series.latencies.len(),
            failures: series.failures(),
            stats: LatencyStats::from_latencies(series.latencies.iter().flatten().copied())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Regression,
    Improvement,
    Neutral,
    /// One side has no successful request.
    Inconclusive,
}

impl Verdict {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Improvement => "improvement",
            Self::Neutral => "neutral",
            Self::Inconclusive => "inconclusive",
        }
    }

    /// Classifies a relative change of the mean latency, in percent.
    #[must_use]
    pub fn from_mean_delta(delta_pct: Option<f64>, threshold_pct: f64) -> Self {
        match delta_pct {
            Some(delta) if delta > threshold_pct => Self::Regression,
            Some(delta) if delta < -threshold_pct => Self::Improvement,
            Some(_) => Self::Neutral,
            None => Self::Inconclusive,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate scenario measured against the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub baseline: String,
    pub candidate: String,
    pub mean_delta_pct: Option<f64>,
    pub p50_delta_pct: Option<f64>,
    /// Index-aligned pairs, both successful, where the candidate was faster.
    pub faster: usize,
    pub slower: usize,
    pub verdict: Verdict,
}

impl Comparison {
    #[must_use]
    pub fn between(
        baseline: (&ScenarioSeries, &ScenarioSummary),
        candidate: (&ScenarioSeries, &ScenarioSummary),
        threshold_pct: f64,
    ) -> Self {
        let (base_series, base_summary) = baseline;
        let (cand_series, cand_summary) = candidate;

        let mut faster = 0usize;
        let mut slower = 0usize;
        for pair in base_series.latencies.iter().zip(&cand_series.latencies) {
            if let (Some(base), Some(cand)) = pair {
                if cand < base {
                    faster = faster.saturating_add(1);
                } else if cand > base {
                    slower = slower.saturating_add(1);
                }
            }
        }

        let (mean_delta_pct, p50_delta_pct) = match (base_summary.stats, cand_summary.stats) {
            (Some(base), Some(cand)) => (
                relative_change(base.mean, cand.mean),
                relative_change(base.p50, cand.p50),
            ),
            _ => (None, None),
        };

        Self {
            baseline: base_series.name.clone(),
            candidate: cand_series.name.clone(),
            mean_delta_pct,
            p50_delta_pct,
            faster,
            slower,
            verdict: Verdict::from_mean_delta(mean_delta_pct, threshold_pct),
        }
    }
}

fn relative_change(base: f64, candidate: f64) -> Option<f64> {
    (base > 0.0).then(|| (candidate - base) / base * 100.0)
}

/// Per-scenario summaries plus every candidate compared to the first scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub summaries: Vec<ScenarioSummary>,
    pub comparisons: Vec<Comparison>,
}

impl ComparisonReport {
    /// The first series is the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error when no series is given or a histogram fails.
    pub fn build(series: &[ScenarioSeries], threshold_pct: f64) -> Result<Self, ReportError> {
        let summaries = series
            .iter()
            .map(ScenarioSummary::from_series)
            .collect::<Result<Vec<_>, _>>()?;
        let (Some(base_series), Some(base_summary)) = (series.first(), summaries.first()) else {
            return Err(ReportError::NoSeries);
        };
        let comparisons = series
            .iter()
            .zip(&summaries)
            .skip(1)
            .map(|candidate| {
                Comparison::between((base_series, base_summary), candidate, threshold_pct)
            })
            .collect();
        Ok(Self {
            summaries,
            comparisons,
        })
    }

    /// Human-readable report, one line per entry.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for summary in &self.summaries {
            lines.push(format!("Scenario: {}", summary.name));
            lines.push(format!(
                "  Requests: {} ({} failed)",
                summary.total, summary.failures
            ));
            match summary.stats {
                Some(stats) => lines.push(format!(
                    "  Latency (ok): min {:.3}ms, mean {:.3}ms, p50 {:.3}ms, p90 {:.3}ms, p99 {:.3}ms, max {:.3}ms",
                    stats.min, stats.mean, stats.p50, stats.p90, stats.p99, stats.max
                )),
                None => lines.push("  Latency (ok): no successful request".to_owned()),
            }
        }
        for comparison in &self.comparisons {
            lines.push(format!(
                "{} vs {}: mean {}, p50 {}, faster on {} / slower on {} requests -> {}",
                comparison.candidate,
                comparison.baseline,
                format_delta(comparison.mean_delta_pct),
                format_delta(comparison.p50_delta_pct),
                comparison.faster,
                comparison.slower,
                comparison.verdict
            ));
        }
        lines
    }
}

fn format_delta(delta: Option<f64>) -> String {
    delta.map_or_else(|| "n/a".to_owned(), |value| format!("{:+.2}%", value))
}
