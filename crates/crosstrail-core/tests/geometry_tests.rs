use crosstrail_core::{segments_intersect, Viewport};
use glam::Vec2;

fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

#[test]
fn crossing_diagonals_intersect() {
    assert!(segments_intersect(v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(10.0, 0.0)));
}

#[test]
fn parallel_segments_do_not_intersect() {
    assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)));
}

#[test]
fn collinear_disjoint_segments_report_no_hit() {
    // Zero denominator: must not panic and must report false.
    assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(3.0, 0.0)));
}

#[test]
fn collinear_overlapping_segments_report_no_hit() {
    assert!(!segments_intersect(v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0), v(3.0, 0.0)));
}

#[test]
fn zero_length_segment_reports_no_hit() {
    assert!(!segments_intersect(v(5.0, 5.0), v(5.0, 5.0), v(0.0, 10.0), v(10.0, 0.0)));
}

#[test]
fn t_junction_on_fractional_pixels_counts() {
    // (44.2, 578.9) sits on the first segment; f32 products lose it.
    assert!(segments_intersect(
        v(6.6, 558.9),
        v(194.6, 658.9),
        v(44.2, 578.9),
        v(273.1, 506.8)
    ));
}

#[test]
fn touching_at_an_endpoint_counts() {
    assert!(segments_intersect(v(0.0, 0.0), v(1.0, 1.0), v(1.0, 1.0), v(2.0, 0.0)));
}

#[test]
fn short_of_reaching_does_not_count() {
    assert!(!segments_intersect(v(0.0, 0.0), v(0.4, 0.4), v(0.0, 1.0), v(1.0, 0.0)));
}

#[test]
fn swapping_segments_gives_the_same_answer() {
    let cases = [
        [v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(10.0, 0.0)],
        [v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)],
        [v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(3.0, 0.0)],
        [v(0.1, 0.7), v(0.9, 0.2), v(0.3, 0.0), v(0.4, 1.0)],
        [v(0.0, 0.0), v(0.4, 0.4), v(0.0, 1.0), v(1.0, 0.0)],
        [v(3.0, 1.0), v(-2.0, 4.0), v(0.0, 0.0), v(0.5, 9.0)],
    ];
    for [p1, p2, p3, p4] in cases {
        assert_eq!(
            segments_intersect(p1, p2, p3, p4),
            segments_intersect(p3, p4, p1, p2),
            "asymmetric result for {p1:?}-{p2:?} vs {p3:?}-{p4:?}"
        );
    }
}

#[test]
fn denormalized_trail_matches_screen_space_test() {
    let vp = Viewport::new(100.0, 100.0);
    let a = vp.denormalize(v(0.0, 0.0));
    let b = vp.denormalize(v(1.0, 1.0));
    assert!(segments_intersect(v(0.0, 100.0), v(100.0, 0.0), a, b));
}
