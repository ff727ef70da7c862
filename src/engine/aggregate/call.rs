/// Argument of an aggregate call as handed over by the query layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    /// Reference to a field, e.g. `value` in `mean(value)`
    FieldRef(String),
    NumberLiteral(f64),
    StringLiteral(String),
}

/// Already-parsed aggregate call, e.g. `percentile(value, 95)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub name: String,
    pub args: Vec<CallArg>,
}

impl AggregateCall {
    pub fn new(name: impl Into<String>, args: Vec<CallArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Convenience for the common single-field form, `name(field)`.
    pub fn on_field(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, vec![CallArg::FieldRef(field.into())])
    }
}

/// Arguments left after validation: the field the aggregate reads and any
/// trailing numeric literals (the percentile rank).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateArgs {
    pub field: Option<String>,
    pub literals: Vec<f64>,
}
