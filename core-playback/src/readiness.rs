//! Three-resource readiness tracking.

use bridge_traits::backend::{Resource, ResourceStatus};
use bridge_traits::media::ItemId;

/// What a status update did to the combined predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameReady,
    BecameUnready,
    Unchanged,
}

/// Tracks engine, item and surface readiness.
///
/// Item status is keyed by item id; updates for any other item are stale and
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    engine: ResourceStatus,
    item: Option<(ItemId, ResourceStatus)>,
    surface: ResourceStatus,
    ready: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn engine(&self) -> &ResourceStatus {
        &self.engine
    }

    pub fn surface(&self) -> &ResourceStatus {
        &self.surface
    }

    pub fn item(&self) -> Option<&ResourceStatus> {
        self.item.as_ref().map(|(_, status)| status)
    }

    /// Apply a status update and re-evaluate the predicate.
    pub fn update(&mut self, resource: Resource, status: ResourceStatus) -> Transition {
        match resource {
            Resource::Engine => self.engine = status,
            Resource::Surface => self.surface = status,
            Resource::Item(id) => match &mut self.item {
                Some((current, item_status)) if *current == id => *item_status = status,
                _ => return Transition::Unchanged,
            },
        }
        self.reevaluate()
    }

    /// Track a newly installed item, initially not ready.
    pub fn track_item(&mut self, id: ItemId) -> Transition {
        self.item = Some((id, ResourceStatus::Unknown));
        self.reevaluate()
    }

    /// Forget the current item.
    pub fn clear_item(&mut self) -> Transition {
        self.item = None;
        self.reevaluate()
    }

    /// Mark the surface not ready (a new one was attached).
    pub fn reset_surface(&mut self) -> Transition {
        self.surface = ResourceStatus::Unknown;
        self.reevaluate()
    }

    fn reevaluate(&mut self) -> Transition {
        let now = self.engine.is_ready()
            && self.surface.is_ready()
            && self.item().is_some_and(ResourceStatus::is_ready);

        let transition = match (self.ready, now) {
            (false, true) => Transition::BecameReady,
            (true, false) => Transition::BecameUnready,
            _ => Transition::Unchanged,
        };
        self.ready = now;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ResourceStatus {
        ResourceStatus::ReadyToPlay
    }

    #[test]
    fn ready_only_when_all_three_are() {
        let mut readiness = Readiness::default();
        let item = ItemId::new();

        assert_eq!(readiness.track_item(item), Transition::Unchanged);
        assert_eq!(readiness.update(Resource::Engine, ready()), Transition::Unchanged);
        assert_eq!(readiness.update(Resource::Surface, ready()), Transition::Unchanged);
        assert!(!readiness.is_ready());

        assert_eq!(readiness.update(Resource::Item(item), ready()), Transition::BecameReady);
        assert!(readiness.is_ready());

        // repeated ready signals do not re-trigger
        assert_eq!(readiness.update(Resource::Engine, ready()), Transition::Unchanged);
    }

    #[test]
    fn failure_drops_readiness() {
        let mut readiness = Readiness::default();
        let item = ItemId::new();
        readiness.track_item(item);
        readiness.update(Resource::Engine, ready());
        readiness.update(Resource::Surface, ready());
        readiness.update(Resource::Item(item), ready());

        let failed = ResourceStatus::Failed {
            reason: "decoder lost".into(),
        };
        assert_eq!(readiness.update(Resource::Engine, failed), Transition::BecameUnready);
        assert!(!readiness.is_ready());
    }

    #[test]
    fn stale_item_updates_are_ignored() {
        let mut readiness = Readiness::default();
        let old = ItemId::new();
        let new = ItemId::new();
        readiness.update(Resource::Engine, ready());
        readiness.update(Resource::Surface, ready());
        readiness.track_item(old);
        readiness.track_item(new);

        assert_eq!(readiness.update(Resource::Item(old), ready()), Transition::Unchanged);
        assert!(!readiness.is_ready());
        assert_eq!(readiness.update(Resource::Item(new), ready()), Transition::BecameReady);
    }

    #[test]
    fn replacing_item_resets_readiness() {
        let mut readiness = Readiness::default();
        let first = ItemId::new();
        readiness.update(Resource::Engine, ready());
        readiness.update(Resource::Surface, ready());
        readiness.track_item(first);
        readiness.update(Resource::Item(first), ready());

        assert_eq!(readiness.track_item(ItemId::new()), Transition::BecameUnready);
        assert_eq!(readiness.clear_item(), Transition::Unchanged);
        assert!(readiness.item().is_none());
    }
}
