use tracing::trace;

use crate::engine::source::PointSource;
use crate::engine::types::{Point, SeriesId};
use crate::shared::config::AggregateConfig;

/// Storage-side cursor that never ends on its own: it signals end-of-stream by
/// returning a point whose series id equals the reserved end marker.
pub trait RawCursor {
    fn next(&mut self) -> Point;
}

impl<F: FnMut() -> Point> RawCursor for F {
    #[inline]
    fn next(&mut self) -> Point {
        self()
    }
}

/// Adapts a sentinel-terminated [`RawCursor`] into a [`PointSource`].
///
/// The end marker is configurable because a marker of `0` silently truncates
/// iteration wherever `0` is also a real series id.
pub struct SentinelSource<C> {
    cursor: C,
    end_marker: SeriesId,
    done: bool,
}

impl<C: RawCursor> SentinelSource<C> {
    pub fn new(cursor: C, end_marker: SeriesId) -> Self {
        Self {
            cursor,
            end_marker,
            done: false,
        }
    }

    pub fn from_config(cursor: C, config: &AggregateConfig) -> Self {
        Self::new(cursor, config.end_of_stream_series_id)
    }

    pub fn end_marker(&self) -> SeriesId {
        self.end_marker
    }
}

impl<C: RawCursor> PointSource for SentinelSource<C> {
    fn next_point(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let point = self.cursor.next();
        if point.series_id == self.end_marker {
            trace!(target: "bucket_agg::source", end_marker = self.end_marker, "Cursor exhausted");
            self.done = true;
            return None;
        }
        Some(point)
    }
}
