//! Destinations for emitted data points

use std::io::Write;
use std::sync::Mutex;

use log::warn;

use super::MetricDataPoint;

/// Receives data points from a finished scrape.
///
/// Emission is fire-and-forget: a sink that cannot deliver a point logs
/// the problem instead of failing the scrape.
pub trait MetricSink: Send + Sync {
    fn emit(&self, point: MetricDataPoint);
}

/// Keeps every emitted data point in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Mutex<Vec<MetricDataPoint>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all data points emitted so far.
    pub fn take(&self) -> Vec<MetricDataPoint> {
        match self.points.lock() {
            Ok(mut points) => std::mem::take(&mut *points),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Number of data points currently held.
    pub fn len(&self) -> usize {
        self.points.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricSink for MemorySink {
    fn emit(&self, point: MetricDataPoint) {
        match self.points.lock() {
            Ok(mut points) => points.push(point),
            Err(poisoned) => poisoned.into_inner().push(point),
        }
    }
}

/// Writes one JSON object per data point, newline separated
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> MetricSink for JsonLinesSink<W> {
    fn emit(&self, point: MetricDataPoint) {
        let line = match serde_json::to_string(&point) {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropping data point {}: {}", point.name, e);
                return;
            }
        };

        let Ok(mut writer) = self.writer.lock() else {
            warn!("Dropping data point {}: writer lock poisoned", point.name);
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Failed to write data point {}: {}", point.name, e);
        }
    }
}
