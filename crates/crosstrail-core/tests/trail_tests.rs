use crosstrail_core::{ParticipantId, Trail, TrailStore, MAX_TRAIL_LENGTH};
use glam::Vec2;

#[test]
fn overfilled_trail_keeps_the_newest_points_in_order() {
    let extra = 7;
    let mut trail = Trail::default();
    for i in 0..(MAX_TRAIL_LENGTH + extra) {
        trail.push(Vec2::new(i as f32, 0.0));
    }
    assert_eq!(trail.len(), MAX_TRAIL_LENGTH);
    let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
    let expected: Vec<f32> = (extra..MAX_TRAIL_LENGTH + extra).map(|i| i as f32).collect();
    assert_eq!(xs, expected);
}

#[test]
fn trail_never_exceeds_capacity() {
    let mut trail = Trail::with_capacity(3);
    for i in 0..10 {
        trail.push(Vec2::splat(i as f32));
        assert!(trail.len() <= 3);
    }
    assert_eq!(trail.last(), Some(Vec2::splat(9.0)));
}

#[test]
fn store_append_creates_and_remove_deletes() {
    let mut store = TrailStore::default();
    let a = ParticipantId::from("a");
    store.append(&a, Vec2::new(0.1, 0.1));
    store.append(&a, Vec2::new(0.2, 0.2));
    assert_eq!(store.get(&a).map(|t| t.len()), Some(2));

    assert!(store.remove(&a).is_some());
    assert!(!store.contains(&a));
    assert!(store.is_empty());
}

#[test]
fn store_reset_empties_an_existing_trail() {
    let mut store = TrailStore::new(5);
    let a = ParticipantId::from("a");
    store.append(&a, Vec2::ONE);
    store.reset(&a);
    let trail = store.get(&a).expect("trail kept after reset");
    assert!(trail.is_empty());
    assert_eq!(trail.capacity(), 5);
}
