//! Point source contract consumed by the map phase.
//!
//! Storage hands out one forward-only cursor per bucket. The engine only ever
//! pulls from it sequentially and never rewinds; once a source reports
//! exhaustion it stays exhausted.

pub mod memory;
pub mod sentinel;

pub use memory::VecSource;
pub use sentinel::{RawCursor, SentinelSource};

use crate::engine::types::Point;

/// Forward-only cursor over the points of a single group-by bucket.
pub trait PointSource {
    /// Returns the next point, or `None` once the bucket is exhausted.
    fn next_point(&mut self) -> Option<Point>;
}

impl<S: PointSource + ?Sized> PointSource for &mut S {
    #[inline]
    fn next_point(&mut self) -> Option<Point> {
        (**self).next_point()
    }
}

impl<S: PointSource + ?Sized> PointSource for Box<S> {
    #[inline]
    fn next_point(&mut self) -> Option<Point> {
        (**self).next_point()
    }
}
