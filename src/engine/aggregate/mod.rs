pub mod call;
pub mod combine;
pub mod ops;
pub mod output;
pub mod partial;
pub mod registry;
pub mod select;
pub mod wire;

pub use call::{AggregateArgs, AggregateCall, CallArg};
pub use output::AggOutput;
pub use partial::{MeanState, Partial, SpreadState};
pub use registry::{AggregateDescriptor, AggregateRegistry, REGISTRY, ResolvedAggregate, resolve};
pub use wire::WireFormat;
