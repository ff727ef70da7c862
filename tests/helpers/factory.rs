pub use super::factories::{CallFactory, PointFactory};

pub struct Factory;

impl Factory {
    pub fn points() -> PointFactory {
        PointFactory::new()
    }

    pub fn call(name: &str) -> CallFactory {
        CallFactory::new(name)
    }
}
