use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::engine::aggregate::call::{AggregateArgs, AggregateCall, CallArg};
use crate::engine::aggregate::combine::{self, ReduceContext, ReduceFn};
use crate::engine::aggregate::ops::{self, MapFn};
use crate::engine::aggregate::output::AggOutput;
use crate::engine::aggregate::partial::Partial;
use crate::engine::aggregate::wire::{self, DecodeFn, WireFormat};
use crate::engine::errors::{DecodeError, EncodeError, InvalidCallError, MapError, ReduceError};
use crate::engine::source::PointSource;

/// Name the raw passthrough descriptor is registered under. It is selected
/// by a function-less call rather than by name lookup.
pub const RAW_PASSTHROUGH: &str = "raw";

pub type ValidateFn = fn(&AggregateCall) -> Result<AggregateArgs, InvalidCallError>;

/// Everything needed to run one aggregate through map, wire and reduce.
#[derive(Clone, Copy)]
pub struct AggregateDescriptor {
    pub name: &'static str,
    pub validate: ValidateFn,
    pub map: MapFn,
    pub reduce: ReduceFn,
    pub decode: DecodeFn,
}

impl fmt::Debug for AggregateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// `name(field)`: exactly one argument, and it must reference a field.
pub fn validate_field(call: &AggregateCall) -> Result<AggregateArgs, InvalidCallError> {
    if call.args.len() != 1 {
        return Err(InvalidCallError::ArgumentCount {
            name: call.name.clone(),
            expected: 1,
            got: call.args.len(),
        });
    }
    let field = expect_field(call)?;
    Ok(AggregateArgs {
        field: Some(field),
        literals: Vec::new(),
    })
}

/// `percentile(field, rank)` with `rank` a number literal in `0..=100`.
pub fn validate_percentile(call: &AggregateCall) -> Result<AggregateArgs, InvalidCallError> {
    if call.args.len() != 2 {
        return Err(InvalidCallError::ArgumentCount {
            name: call.name.clone(),
            expected: 2,
            got: call.args.len(),
        });
    }
    let field = expect_field(call)?;
    let rank = match &call.args[1] {
        CallArg::NumberLiteral(rank) => *rank,
        _ => return Err(InvalidCallError::NotNumberLiteral(call.name.clone())),
    };
    if !rank.is_finite() || !(0.0..=100.0).contains(&rank) {
        return Err(InvalidCallError::RankOutOfRange {
            name: call.name.clone(),
            rank,
        });
    }
    Ok(AggregateArgs {
        field: Some(field),
        literals: vec![rank],
    })
}

fn expect_field(call: &AggregateCall) -> Result<String, InvalidCallError> {
    match call.args.first() {
        Some(CallArg::FieldRef(field)) => Ok(field.clone()),
        _ => Err(InvalidCallError::NotFieldRef(call.name.clone())),
    }
}

fn validate_none(_call: &AggregateCall) -> Result<AggregateArgs, InvalidCallError> {
    Ok(AggregateArgs::default())
}

fn builtin(
    name: &'static str,
    map: MapFn,
    reduce: ReduceFn,
    decode: DecodeFn,
) -> AggregateDescriptor {
    AggregateDescriptor {
        name,
        validate: validate_field,
        map,
        reduce,
        decode,
    }
}

/// Dispatcher: aggregate name -> descriptor.
///
/// New aggregates are added with [`AggregateRegistry::register`].
#[derive(Debug, Clone)]
pub struct AggregateRegistry {
    descriptors: HashMap<String, AggregateDescriptor>,
    raw: AggregateDescriptor,
}

impl Default for AggregateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateRegistry {
    /// Registry holding only raw passthrough.
    pub fn empty() -> Self {
        Self {
            descriptors: HashMap::new(),
            raw: AggregateDescriptor {
                name: RAW_PASSTHROUGH,
                validate: validate_none,
                map: ops::map_raw,
                reduce: combine::reduce_raw,
                decode: wire::decode_raw,
            },
        }
    }

    /// Registry with the built-in aggregates.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for descriptor in [
            builtin("count", ops::map_count, combine::reduce_sum, wire::decode_scalar),
            builtin("sum", ops::map_sum, combine::reduce_sum, wire::decode_scalar),
            builtin("mean", ops::map_mean, combine::reduce_mean, wire::decode_mean),
            builtin("min", ops::map_min, combine::reduce_min, wire::decode_scalar),
            builtin("max", ops::map_max, combine::reduce_max, wire::decode_scalar),
            builtin("spread", ops::map_spread, combine::reduce_spread, wire::decode_spread),
            builtin("stddev", ops::map_values, combine::reduce_stddev, wire::decode_values),
            builtin("median", ops::map_values, combine::reduce_median, wire::decode_values),
            builtin("first", ops::map_first, combine::reduce_first, wire::decode_extremum),
            builtin("last", ops::map_last, combine::reduce_last, wire::decode_extremum),
            AggregateDescriptor {
                name: "percentile",
                validate: validate_percentile,
                map: ops::map_values,
                reduce: combine::reduce_percentile,
                decode: wire::decode_values,
            },
        ] {
            registry.register(descriptor);
        }
        registry
    }

    /// Adds or replaces a descriptor, returning the one it displaced.
    pub fn register(&mut self, descriptor: AggregateDescriptor) -> Option<AggregateDescriptor> {
        let previous = self
            .descriptors
            .insert(descriptor.name.to_string(), descriptor);
        if previous.is_some() {
            warn!(target: "bucket_agg::dispatch", aggregate = descriptor.name, "Replacing registered aggregate");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&AggregateDescriptor> {
        self.descriptors.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validates `call` and binds it to its descriptor. `None` means no
    /// aggregate was requested and selects raw passthrough.
    pub fn resolve(&self, call: Option<&AggregateCall>) -> Result<ResolvedAggregate, InvalidCallError> {
        let Some(call) = call else {
            debug!(target: "bucket_agg::dispatch", "No aggregate requested, using raw passthrough");
            return Ok(ResolvedAggregate {
                descriptor: self.raw,
                args: AggregateArgs::default(),
            });
        };

        let descriptor = self.get(&call.name).copied().ok_or_else(|| {
            debug!(target: "bucket_agg::dispatch", aggregate = %call.name, "Unknown aggregate");
            InvalidCallError::UnknownFunction(call.name.clone())
        })?;
        let args = (descriptor.validate)(call).inspect_err(|e| {
            debug!(target: "bucket_agg::dispatch", aggregate = %call.name, error = %e, "Rejected aggregate call");
        })?;

        debug!(
            target: "bucket_agg::dispatch",
            aggregate = descriptor.name,
            field = ?args.field,
            "Resolved aggregate call"
        );
        Ok(ResolvedAggregate { descriptor, args })
    }
}

/// Process-wide registry of the built-in aggregates.
pub static REGISTRY: Lazy<AggregateRegistry> = Lazy::new(AggregateRegistry::new);

/// Resolves `call` against the built-in registry.
pub fn resolve(call: Option<&AggregateCall>) -> Result<ResolvedAggregate, InvalidCallError> {
    REGISTRY.resolve(call)
}

/// A validated call bound to its descriptor; threaded unchanged through map,
/// wire and reduce so every phase agrees on the partial's shape.
#[derive(Debug, Clone)]
pub struct ResolvedAggregate {
    descriptor: AggregateDescriptor,
    args: AggregateArgs,
}

impl ResolvedAggregate {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn args(&self) -> &AggregateArgs {
        &self.args
    }

    pub fn is_raw(&self) -> bool {
        self.descriptor.name == RAW_PASSTHROUGH
    }

    pub fn map(&self, source: &mut dyn PointSource) -> Result<Option<Partial>, MapError> {
        (self.descriptor.map)(self.descriptor.name, source)
    }

    /// Combines with a freshly seeded per-call generator.
    pub fn reduce(&self, partials: Vec<Option<Partial>>) -> Result<Option<AggOutput>, ReduceError> {
        let mut rng = StdRng::from_entropy();
        self.reduce_with_rng(partials, &mut rng)
    }

    pub fn reduce_with_rng(
        &self,
        partials: Vec<Option<Partial>>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AggOutput>, ReduceError> {
        let mut ctx = ReduceContext {
            aggregate: self.descriptor.name,
            args: &self.args,
            rng,
        };
        (self.descriptor.reduce)(&mut ctx, partials)
    }

    pub fn encode(&self, partial: Option<&Partial>, format: WireFormat) -> Result<Vec<u8>, EncodeError> {
        wire::encode(self.descriptor.name, partial, format)
    }

    pub fn decode(&self, bytes: &[u8], format: WireFormat) -> Result<Option<Partial>, DecodeError> {
        (self.descriptor.decode)(self.descriptor.name, bytes, format)
    }
}
