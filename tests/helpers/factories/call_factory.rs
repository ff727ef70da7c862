use crate::engine::aggregate::call::{AggregateCall, CallArg};

pub struct CallFactory {
    name: String,
    args: Vec<CallArg>,
}

impl CallFactory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.args.push(CallArg::FieldRef(field.to_string()));
        self
    }

    pub fn with_number(mut self, value: f64) -> Self {
        self.args.push(CallArg::NumberLiteral(value));
        self
    }

    pub fn with_string(mut self, value: &str) -> Self {
        self.args.push(CallArg::StringLiteral(value.to_string()));
        self
    }

    pub fn create(self) -> AggregateCall {
        AggregateCall::new(self.name, self.args)
    }
}
