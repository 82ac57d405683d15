use timeline_rs::core::{FeedDescriptor, FeedRegistry, FeedShape, Sample, TimeSpan};

fn sample(timestamp: f64, value: f64) -> Sample {
    Sample::new(timestamp, value).expect("valid sample")
}

fn gap(timestamp: f64) -> Sample {
    Sample::missing(timestamp).expect("valid gap sample")
}

#[test]
fn lane_order_follows_insertion_order() {
    let mut registry = FeedRegistry::new();
    let first = registry
        .add_feed(
            FeedDescriptor::new("Sleep", FeedShape::Points),
            vec![sample(100.0, 7.0)],
        )
        .expect("add");
    let second = registry
        .add_feed(
            FeedDescriptor::new("Steps", FeedShape::Bars),
            vec![sample(50.0, 9_000.0)],
        )
        .expect("add");
    let third = registry
        .add_feed(
            FeedDescriptor::new("Weight", FeedShape::Line),
            vec![sample(75.0, 82.5)],
        )
        .expect("add");

    assert_eq!(registry.lane_index_of(first), Some(0));
    assert_eq!(registry.lane_index_of(second), Some(1));
    assert_eq!(registry.lane_index_of(third), Some(2));

    let labels: Vec<&str> = registry
        .iter()
        .map(|feed| feed.descriptor().label.as_str())
        .collect();
    assert_eq!(labels, vec!["Sleep", "Steps", "Weight"]);
}

#[test]
fn removal_shifts_later_lanes_up() {
    let mut registry = FeedRegistry::new();
    let first = registry
        .add_feed(
            FeedDescriptor::new("a", FeedShape::Points),
            vec![sample(1.0, 1.0)],
        )
        .expect("add");
    let second = registry
        .add_feed(
            FeedDescriptor::new("b", FeedShape::Points),
            vec![sample(2.0, 2.0)],
        )
        .expect("add");
    let third = registry
        .add_feed(
            FeedDescriptor::new("c", FeedShape::Points),
            vec![sample(3.0, 3.0)],
        )
        .expect("add");

    registry.remove_feed(second).expect("remove");
    assert_eq!(registry.lane_index_of(first), Some(0));
    assert_eq!(registry.lane_index_of(second), None);
    assert_eq!(registry.lane_index_of(third), Some(1));
    assert!(registry.remove_feed(second).is_err());
}

#[test]
fn feed_ids_are_never_reused() {
    let mut registry = FeedRegistry::new();
    let first = registry
        .add_feed(
            FeedDescriptor::new("a", FeedShape::Points),
            vec![sample(1.0, 1.0)],
        )
        .expect("add");
    registry.remove_feed(first).expect("remove");

    let second = registry
        .add_feed(
            FeedDescriptor::new("b", FeedShape::Points),
            vec![sample(2.0, 2.0)],
        )
        .expect("add");
    assert_ne!(first, second);
    assert!(registry.get(first).is_none());
}

#[test]
fn full_span_unions_all_feed_extents() {
    let mut registry = FeedRegistry::new();
    assert!(registry.full_span().is_none());

    registry
        .add_feed(
            FeedDescriptor::new("a", FeedShape::Points),
            vec![sample(100.0, 1.0), sample(500.0, 2.0)],
        )
        .expect("add");
    registry
        .add_feed(
            FeedDescriptor::new("b", FeedShape::Points),
            vec![sample(-50.0, 1.0), sample(200.0, 2.0)],
        )
        .expect("add");

    let span = registry.full_span().expect("span");
    assert_eq!(span, TimeSpan::new(-50.0, 500.0).expect("span"));
}

#[test]
fn update_keeps_identity_and_lane_position() {
    let mut registry = FeedRegistry::new();
    let first = registry
        .add_feed(
            FeedDescriptor::new("a", FeedShape::Points),
            vec![sample(1.0, 1.0)],
        )
        .expect("add");
    let second = registry
        .add_feed(
            FeedDescriptor::new("b", FeedShape::Points),
            vec![sample(2.0, 2.0)],
        )
        .expect("add");

    registry
        .update_feed(first, vec![sample(10.0, 5.0), sample(20.0, 6.0)])
        .expect("update");
    assert_eq!(registry.lane_index_of(first), Some(0));
    assert_eq!(registry.lane_index_of(second), Some(1));
    assert_eq!(registry.get(first).expect("feed").samples().len(), 2);

    let missing = second;
    registry.remove_feed(missing).expect("remove");
    assert!(registry.update_feed(missing, vec![sample(1.0, 1.0)]).is_err());
}

#[test]
fn feeds_without_usable_samples_are_rejected() {
    let mut registry = FeedRegistry::new();
    assert!(
        registry
            .add_feed(FeedDescriptor::new("empty", FeedShape::Points), Vec::new())
            .is_err()
    );
}

#[test]
fn event_feeds_report_no_values() {
    let mut registry = FeedRegistry::new();
    let id = registry
        .add_feed(
            FeedDescriptor::new("Walks", FeedShape::Points),
            vec![gap(100.0), gap(200.0)],
        )
        .expect("add");

    let feed = registry.get(id).expect("feed");
    assert!(!feed.has_values());
    assert!(feed.value_ceiling().is_none());
}

#[test]
fn value_ceiling_skips_suppressed_readings() {
    let mut registry = FeedRegistry::new();
    let id = registry
        .add_feed(
            FeedDescriptor::new("Battery", FeedShape::Line).with_min_valid_value(2.0),
            vec![
                sample(0.0, 9.0),
                sample(60.0, 1.5),
                sample(120.0, 4.0),
                gap(180.0),
            ],
        )
        .expect("add");

    let feed = registry.get(id).expect("feed");
    assert_eq!(feed.value_ceiling(), Some(9.0));
    // Readings at the floor are suppressed along with those below it.
    assert_eq!(feed.effective_value(sample(0.0, 2.0)), None);
    assert_eq!(feed.effective_value(sample(0.0, 2.1)), Some(2.1));
}

#[test]
fn clear_empties_the_registry() {
    let mut registry = FeedRegistry::new();
    registry
        .add_feed(
            FeedDescriptor::new("a", FeedShape::Points),
            vec![sample(1.0, 1.0)],
        )
        .expect("add");
    assert!(!registry.is_empty());

    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.full_span().is_none());
}
