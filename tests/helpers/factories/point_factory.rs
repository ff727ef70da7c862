use crate::engine::source::VecSource;
use crate::engine::types::{Point, PointValue, SeriesId, Timestamp};

/// Builds points with evenly spaced timestamps.
pub struct PointFactory {
    series_id: SeriesId,
    start: Timestamp,
    step: Timestamp,
}

impl PointFactory {
    pub fn new() -> Self {
        Self {
            series_id: 1,
            start: 1_000,
            step: 10,
        }
    }

    pub fn with_series(mut self, series_id: SeriesId) -> Self {
        self.series_id = series_id;
        self
    }

    pub fn with_start(mut self, start: Timestamp) -> Self {
        self.start = start;
        self
    }

    pub fn with_step(mut self, step: Timestamp) -> Self {
        self.step = step;
        self
    }

    pub fn numeric(&self, values: &[f64]) -> Vec<Point> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Point::new(self.series_id, self.start + i as i64 * self.step, *v))
            .collect()
    }

    pub fn timed(&self, pairs: &[(Timestamp, PointValue)]) -> Vec<Point> {
        pairs
            .iter()
            .map(|(ts, v)| Point::new(self.series_id, *ts, v.clone()))
            .collect()
    }

    pub fn source(&self, values: &[f64]) -> VecSource {
        VecSource::new(self.numeric(values))
    }

    /// Splits `values` into `parts` contiguous shards. Trailing shards may be
    /// empty when there are fewer values than parts.
    pub fn shards(&self, values: &[f64], parts: usize) -> Vec<VecSource> {
        let points = self.numeric(values);
        let per_shard = points.len().div_ceil(parts.max(1)).max(1);
        let mut chunks: Vec<VecSource> = points
            .chunks(per_shard)
            .map(|chunk| VecSource::new(chunk.to_vec()))
            .collect();
        while chunks.len() < parts {
            chunks.push(VecSource::default());
        }
        chunks
    }
}
