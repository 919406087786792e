//! Detects the local participant's newest segment crossing a foreign trail.

use glam::Vec2;

use crate::geometry::{segments_intersect, Viewport};
use crate::protocol::ParticipantId;
use crate::trail::TrailStore;

/// Scans every foreign trail for a segment crossed by `from -> to`.
///
/// `from`/`to` are screen-space; foreign trails hold normalized points and
/// are denormalized through `viewport` as they are tested. Trails are
/// visited in arbitrary order and the scan stops at the first hit, so at
/// most one participant is reported per local move.
pub fn find_crossing<'a>(
    from: Vec2,
    to: Vec2,
    trails: &'a TrailStore,
    self_id: Option<&ParticipantId>,
    viewport: Viewport,
) -> Option<&'a ParticipantId> {
    trails
        .iter()
        .filter(|(id, _)| Some(*id) != self_id)
        .find(|(_, trail)| {
            trail.segments().any(|(a, b)| {
                segments_intersect(from, to, viewport.denormalize(a), viewport.denormalize(b))
            })
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_trail_is_never_reported() {
        let me = ParticipantId::from("me");
        let mut trails = TrailStore::default();
        trails.append(&me, Vec2::new(0.0, 0.0));
        trails.append(&me, Vec2::new(1.0, 1.0));
        let hit = find_crossing(
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
            &trails,
            Some(&me),
            Viewport::default(),
        );
        assert!(hit.is_none());
    }
}
