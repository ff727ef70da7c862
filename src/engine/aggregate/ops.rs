use crate::engine::aggregate::partial::{MeanState, Partial, SpreadState};
use crate::engine::errors::MapError;
use crate::engine::source::PointSource;
use crate::engine::types::{Point, PointValue, Timestamp, TimedValue};

/// Signature of every map function: fold one bucket's source into a partial.
pub type MapFn = fn(&str, &mut dyn PointSource) -> Result<Option<Partial>, MapError>;

#[inline]
fn numeric(aggregate: &str, point: &Point) -> Result<f64, MapError> {
    point.value.as_f64().ok_or_else(|| MapError::NonNumeric {
        aggregate: aggregate.to_string(),
        series_id: point.series_id,
        timestamp: point.timestamp,
        found: point.value.type_name(),
    })
}

/// Drains `source`, handing each numeric value to `f`.
fn for_each_numeric(
    aggregate: &str,
    source: &mut dyn PointSource,
    mut f: impl FnMut(f64),
) -> Result<(), MapError> {
    while let Some(point) = source.next_point() {
        f(numeric(aggregate, &point)?);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Count {
    count: u64,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn update(&mut self) {
        self.count += 1;
    }

    pub fn finalize(&self) -> Option<f64> {
        (self.count > 0).then_some(self.count as f64)
    }
}

/// Sum keeps a count next to the total so that an empty input stays distinct
/// from a real zero sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sum {
    sum: f64,
    count: u64,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn update(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    pub fn finalize(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mean {
    count: u64,
    mean: f64,
}

impl Mean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremental update keeps the running value near the data's magnitude
    /// instead of growing an unbounded sum.
    #[inline]
    pub fn update(&mut self, v: f64) {
        self.count += 1;
        self.mean += (v - self.mean) / self.count as f64;
    }

    /// Count-weighted merge. Exact arithmetic makes this order independent;
    /// in floating point the rounding depends on the order partials arrive.
    pub fn merge(&mut self, other: &MeanState) {
        if other.count == 0 {
            return;
        }
        let total = self.count + other.count;
        self.mean = other.mean * (other.count as f64 / total as f64)
            + self.mean * (self.count as f64 / total as f64);
        self.count = total;
    }

    pub fn state(&self) -> Option<MeanState> {
        (self.count > 0).then_some(MeanState {
            count: self.count,
            mean: self.mean,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Min {
    min: Option<f64>,
}

impl Min {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn update(&mut self, v: f64) {
        match self.min {
            Some(cur) => self.min = Some(cur.min(v)),
            None => self.min = Some(v),
        }
    }

    pub fn finalize(&self) -> Option<f64> {
        self.min
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Max {
    max: Option<f64>,
}

impl Max {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn update(&mut self, v: f64) {
        match self.max {
            Some(cur) => self.max = Some(cur.max(v)),
            None => self.max = Some(v),
        }
    }

    pub fn finalize(&self) -> Option<f64> {
        self.max
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spread {
    range: Option<SpreadState>,
}

impl Spread {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn update(&mut self, v: f64) {
        self.merge(&SpreadState { min: v, max: v });
    }

    pub fn merge(&mut self, other: &SpreadState) {
        match &mut self.range {
            Some(range) => range.merge(other),
            None => self.range = Some(*other),
        }
    }

    pub fn state(&self) -> Option<SpreadState> {
        self.range
    }
}

/// Which end of the timeline a [`TimeExtremum`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    First,
    Last,
}

/// Tracks the earliest or latest `{timestamp, value}`. Only a strictly
/// earlier/later timestamp replaces the current candidate, so ties keep the
/// first one seen.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeExtremum {
    edge: Edge,
    best: Option<TimedValue>,
}

impl TimeExtremum {
    pub fn new(edge: Edge) -> Self {
        Self { edge, best: None }
    }

    pub fn update(&mut self, timestamp: Timestamp, value: PointValue) {
        let replace = match &self.best {
            None => true,
            Some(cur) => match self.edge {
                Edge::First => timestamp < cur.timestamp,
                Edge::Last => timestamp > cur.timestamp,
            },
        };
        if replace {
            self.best = Some(TimedValue { timestamp, value });
        }
    }

    pub fn merge(&mut self, other: TimedValue) {
        self.update(other.timestamp, other.value);
    }

    pub fn finalize(self) -> Option<TimedValue> {
        self.best
    }
}

// Map functions -----------------------------------------------------------

pub fn map_count(_aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Count::new();
    while source.next_point().is_some() {
        acc.update();
    }
    Ok(acc.finalize().map(Partial::Scalar))
}

pub fn map_sum(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Sum::new();
    for_each_numeric(aggregate, source, |v| acc.update(v))?;
    Ok(acc.finalize().map(Partial::Scalar))
}

pub fn map_mean(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Mean::new();
    for_each_numeric(aggregate, source, |v| acc.update(v))?;
    Ok(acc.state().map(Partial::Mean))
}

pub fn map_min(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Min::new();
    for_each_numeric(aggregate, source, |v| acc.update(v))?;
    Ok(acc.finalize().map(Partial::Scalar))
}

pub fn map_max(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Max::new();
    for_each_numeric(aggregate, source, |v| acc.update(v))?;
    Ok(acc.finalize().map(Partial::Scalar))
}

pub fn map_spread(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut acc = Spread::new();
    for_each_numeric(aggregate, source, |v| acc.update(v))?;
    Ok(acc.state().map(Partial::Spread))
}

/// Collects raw values with no local reduction. Used by stddev and median,
/// and as the percentile echo: exact ranks cannot be pre-reduced per shard.
pub fn map_values(aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut values = Vec::new();
    for_each_numeric(aggregate, source, |v| values.push(v))?;
    Ok((!values.is_empty()).then_some(Partial::Values(values)))
}

fn map_edge(edge: Edge, source: &mut dyn PointSource) -> Option<Partial> {
    let mut acc = TimeExtremum::new(edge);
    while let Some(point) = source.next_point() {
        acc.update(point.timestamp, point.value);
    }
    acc.finalize().map(Partial::Extremum)
}

pub fn map_first(_aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    Ok(map_edge(Edge::First, source))
}

pub fn map_last(_aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    Ok(map_edge(Edge::Last, source))
}

/// Raw passthrough: every `(timestamp, value)` unchanged, in source order.
pub fn map_raw(_aggregate: &str, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
    let mut rows = Vec::new();
    while let Some(point) = source.next_point() {
        rows.push(TimedValue::from(point));
    }
    Ok((!rows.is_empty()).then_some(Partial::Raw(rows)))
}
