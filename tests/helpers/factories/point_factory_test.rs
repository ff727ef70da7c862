use crate::engine::source::PointSource;
use crate::test_helpers::factory::Factory;

#[test]
fn test_point_factory_spacing() {
    let points = Factory::points()
        .with_series(9)
        .with_start(100)
        .with_step(5)
        .numeric(&[1.0, 2.0, 3.0]);

    let timestamps: Vec<i64> = points.iter().map(|p| p.timestamp).collect();
    assert_eq!(timestamps, vec![100, 105, 110]);
    assert!(points.iter().all(|p| p.series_id == 9));
}

#[test]
fn test_point_factory_shards_cover_all_values() {
    let mut shards = Factory::points().shards(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert_eq!(shards.len(), 3);

    let mut total = 0;
    for shard in shards.iter_mut() {
        while shard.next_point().is_some() {
            total += 1;
        }
    }
    assert_eq!(total, 5);
}

#[test]
fn test_point_factory_pads_empty_shards() {
    let shards = Factory::points().shards(&[1.0], 4);
    assert_eq!(shards.len(), 4);
    assert_eq!(shards[0].remaining(), 1);
    assert!(shards[1..].iter().all(|s| s.remaining() == 0));
}
