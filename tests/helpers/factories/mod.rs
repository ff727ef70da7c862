pub mod call_factory;
pub mod point_factory;

pub use call_factory::CallFactory;
pub use point_factory::PointFactory;

#[cfg(test)]
mod call_factory_test;
#[cfg(test)]
mod point_factory_test;
