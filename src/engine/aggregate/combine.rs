//! Reduce phase: fold every shard's partial for one bucket into the answer.
//!
//! Combiners take ownership of the partial list and skip `None` entries
//! (shards that saw no data). They fold whatever they are given; checking that
//! every expected shard contributed is the caller's job.

use rand::RngCore;
use tracing::trace;

use crate::engine::aggregate::call::AggregateArgs;
use crate::engine::aggregate::ops::{Edge, Max, Mean, Min, Spread, Sum, TimeExtremum};
use crate::engine::aggregate::output::AggOutput;
use crate::engine::aggregate::partial::{MeanState, Partial, SpreadState};
use crate::engine::aggregate::select::sorted_range;
use crate::engine::errors::ReduceError;
use crate::engine::types::TimedValue;

/// Everything a combiner may need besides the partials themselves.
pub struct ReduceContext<'a> {
    pub aggregate: &'a str,
    pub args: &'a AggregateArgs,
    /// Pivot source for selection-based combiners
    pub rng: &'a mut dyn RngCore,
}

impl ReduceContext<'_> {
    fn unexpected(&self, partial: &Partial) -> ReduceError {
        ReduceError::UnexpectedPartial {
            aggregate: self.aggregate.to_string(),
            found: partial.kind(),
        }
    }
}

pub type ReduceFn =
    fn(&mut ReduceContext<'_>, Vec<Option<Partial>>) -> Result<Option<AggOutput>, ReduceError>;

fn scalars(ctx: &ReduceContext<'_>, partials: Vec<Option<Partial>>) -> Result<Vec<f64>, ReduceError> {
    partials
        .into_iter()
        .flatten()
        .map(|p| match p {
            Partial::Scalar(v) => Ok(v),
            other => Err(ctx.unexpected(&other)),
        })
        .collect()
}

/// Concatenates `Values` partials into one owned buffer.
fn concat_values(
    ctx: &ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Vec<f64>, ReduceError> {
    let mut data = Vec::new();
    for partial in partials.into_iter().flatten() {
        match partial {
            Partial::Values(mut values) => data.append(&mut values),
            other => return Err(ctx.unexpected(&other)),
        }
    }
    Ok(data)
}

/// Shared by count and sum: both combine by adding partials.
pub fn reduce_sum(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = Sum::new();
    for v in scalars(ctx, partials)? {
        acc.update(v);
    }
    Ok(acc.finalize().map(AggOutput::Number))
}

pub fn reduce_mean(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = Mean::new();
    for partial in partials.into_iter().flatten() {
        match partial {
            Partial::Mean(state) => acc.merge(&state),
            other => return Err(ctx.unexpected(&other)),
        }
    }
    Ok(acc.state().map(|MeanState { mean, .. }| AggOutput::Number(mean)))
}

pub fn reduce_min(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = Min::new();
    for v in scalars(ctx, partials)? {
        acc.update(v);
    }
    Ok(acc.finalize().map(AggOutput::Number))
}

pub fn reduce_max(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = Max::new();
    for v in scalars(ctx, partials)? {
        acc.update(v);
    }
    Ok(acc.finalize().map(AggOutput::Number))
}

pub fn reduce_spread(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = Spread::new();
    for partial in partials.into_iter().flatten() {
        match partial {
            Partial::Spread(state) => acc.merge(&state),
            other => return Err(ctx.unexpected(&other)),
        }
    }
    Ok(acc
        .state()
        .map(|range: SpreadState| AggOutput::Number(range.spread())))
}

/// Sample standard deviation (n - 1 denominator). Fewer than two points
/// overall leave it undefined.
pub fn reduce_stddev(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let data = concat_values(ctx, partials)?;
    if data.len() < 2 {
        return Ok(None);
    }

    let mut mean = Mean::new();
    for &v in &data {
        mean.update(v);
    }
    let Some(MeanState { count, mean }) = mean.state() else {
        return Ok(None);
    };

    let squares: f64 = data.iter().map(|v| (v - mean).powi(2)).sum();
    let variance = squares / (count - 1) as f64;
    Ok(Some(AggOutput::Number(variance.sqrt())))
}

pub fn reduce_median(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let data = concat_values(ctx, partials)?;
    let length = data.len();
    match length {
        0 => return Ok(None),
        1 => return Ok(Some(AggOutput::Number(data[0]))),
        _ => {}
    }

    let middle = length / 2;
    trace!(target: "bucket_agg::select", length, middle, "Selecting median");
    if length % 2 == 0 {
        let range = sorted_range(data, middle - 1, 2, &mut *ctx.rng);
        let (low, high) = (range[0], range[1]);
        Ok(Some(AggOutput::Number(low + (high - low) / 2.0)))
    } else {
        let range = sorted_range(data, middle, 1, &mut *ctx.rng);
        Ok(Some(AggOutput::Number(range[0])))
    }
}

/// Nearest-rank percentile over every shard's echoed values.
pub fn reduce_percentile(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let Some(rank) = ctx.args.literals.first().copied() else {
        return Err(ReduceError::MissingArgument {
            aggregate: ctx.aggregate.to_string(),
            what: "rank",
        });
    };

    let mut data = concat_values(ctx, partials)?;
    data.sort_by(f64::total_cmp);

    let length = data.len();
    let index = (length as f64 * rank / 100.0 + 0.5).floor() as i64 - 1;
    if index < 0 || index as usize >= length {
        return Ok(None);
    }
    Ok(Some(AggOutput::Number(data[index as usize])))
}

fn reduce_edge(
    ctx: &ReduceContext<'_>,
    edge: Edge,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut acc = TimeExtremum::new(edge);
    for partial in partials.into_iter().flatten() {
        match partial {
            Partial::Extremum(candidate) => acc.merge(candidate),
            other => return Err(ctx.unexpected(&other)),
        }
    }
    Ok(acc.finalize().map(|best| AggOutput::Value(best.value)))
}

pub fn reduce_first(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    reduce_edge(ctx, Edge::First, partials)
}

pub fn reduce_last(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    reduce_edge(ctx, Edge::Last, partials)
}

/// Raw passthrough has no reduction: concatenate, then stable-sort by time.
/// Always answers, with an empty list when no shard saw data.
pub fn reduce_raw(
    ctx: &mut ReduceContext<'_>,
    partials: Vec<Option<Partial>>,
) -> Result<Option<AggOutput>, ReduceError> {
    let mut rows: Vec<TimedValue> = Vec::new();
    for partial in partials.into_iter().flatten() {
        match partial {
            Partial::Raw(mut part) => rows.append(&mut part),
            other => return Err(ctx.unexpected(&other)),
        }
    }
    rows.sort_by_key(|row| row.timestamp);
    Ok(Some(AggOutput::Points(rows)))
}
