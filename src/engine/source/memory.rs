use std::collections::VecDeque;

use crate::engine::source::PointSource;
use crate::engine::types::Point;

/// In-memory source over an owned list of points.
#[derive(Debug, Default, Clone)]
pub struct VecSource {
    points: VecDeque<Point>,
}

impl VecSource {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.points.len()
    }
}

impl From<Vec<Point>> for VecSource {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl PointSource for VecSource {
    #[inline]
    fn next_point(&mut self) -> Option<Point> {
        self.points.pop_front()
    }
}
