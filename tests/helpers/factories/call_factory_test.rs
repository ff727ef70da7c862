use crate::engine::aggregate::call::CallArg;
use crate::test_helpers::factory::Factory;

#[test]
fn test_call_factory() {
    let call = Factory::call("percentile")
        .with_field("value")
        .with_number(95.0)
        .create();

    assert_eq!(call.name, "percentile");
    assert_eq!(
        call.args,
        vec![
            CallArg::FieldRef("value".into()),
            CallArg::NumberLiteral(95.0)
        ]
    );
}
