//! Object registry
//!
//! Owns every live object together with its timer. Lifecycle transitions go
//! through here so the timer bookkeeping and the state always move together.

use std::collections::BTreeMap;

use super::clock::{Millis, Scheduler, TimerHandle};
use super::object::{GameObject, Lifecycle, ObjectId};

/// Live objects keyed by id (sorted, so iteration is deterministic)
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    objects: BTreeMap<ObjectId, GameObject>,
    next_id: u32,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register an idle object and activate it. Returns its fresh id.
    pub fn add(&mut self, mut object: GameObject) -> ObjectId {
        debug_assert_eq!(object.state, Lifecycle::Idle);
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        object.id = id;
        object.state = Lifecycle::Active;
        object.timer = None;
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Resolve and remove an object, cancelling its timer
    pub fn remove<E>(&mut self, id: ObjectId, clock: &mut Scheduler<E>) -> Option<GameObject> {
        let mut object = self.objects.remove(&id)?;
        if let Some(timer) = object.timer.take() {
            clock.cancel(timer);
        }
        object.state = Lifecycle::Resolved;
        Some(object)
    }

    /// Remove everything, cancelling timers first. Returns the removed objects
    /// in id order.
    pub fn clear<E>(&mut self, clock: &mut Scheduler<E>) -> Vec<GameObject> {
        let objects = std::mem::take(&mut self.objects);
        objects
            .into_values()
            .map(|mut object| {
                if let Some(timer) = object.timer.take() {
                    clock.cancel(timer);
                }
                object.state = Lifecycle::Resolved;
                object
            })
            .collect()
    }

    /// Arm (or re-arm) the object's timer. Any previous timer is cancelled.
    pub fn arm<E>(
        &mut self,
        id: ObjectId,
        clock: &mut Scheduler<E>,
        delay: Millis,
        event: E,
    ) -> Option<TimerHandle> {
        let object = self.objects.get_mut(&id)?;
        if let Some(old) = object.timer.take() {
            clock.cancel(old);
        }
        let handle = clock.schedule(delay, event);
        object.timer = Some(handle);
        Some(handle)
    }

    /// Cancel every object's timer, leaving the objects in place
    pub fn disarm_all<E>(&mut self, clock: &mut Scheduler<E>) {
        for object in self.objects.values_mut() {
            if let Some(timer) = object.timer.take() {
                clock.cancel(timer);
            }
        }
    }

    /// Move an active object into its grace window, swapping in the grace timer.
    /// Returns false if the object is missing or not active.
    pub fn begin_grace<E>(
        &mut self,
        id: ObjectId,
        clock: &mut Scheduler<E>,
        delay: Millis,
        event: E,
    ) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        if !object.state.can_become(Lifecycle::Grace) {
            return false;
        }
        if let Some(old) = object.timer.take() {
            clock.cancel(old);
        }
        object.state = Lifecycle::Grace;
        object.timer = Some(clock.schedule(delay, event));
        true
    }

    /// Whether `handle` is the timer currently owned by `id` in state `state`.
    /// Timer callbacks check this before acting.
    pub fn is_current(&self, id: ObjectId, handle: TimerHandle, state: Lifecycle) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|o| o.timer == Some(handle) && o.state == state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameObject> {
        self.objects.values_mut()
    }

    pub fn for_each(&self, f: impl FnMut(&GameObject)) {
        self.objects.values().for_each(f);
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in `Active` (grace objects excluded)
    pub fn active_count(&self) -> usize {
        self.objects
            .values()
            .filter(|o| o.state == Lifecycle::Active)
            .count()
    }

    /// Object occupying a grid cell
    pub fn in_cell(&self, cell: usize) -> Option<ObjectId> {
        self.objects
            .values()
            .find(|o| o.cell() == Some(cell))
            .map(|o| o.id)
    }

    /// Number of armed timers (for leak checks)
    pub fn armed_count(&self) -> usize {
        self.objects.values().filter(|o| o.timer.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::object::{ObjectKind, Position};

    fn tile(cell: usize) -> GameObject {
        GameObject::new(ObjectKind::Red, Position::Cell(cell))
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut reg = ObjectRegistry::new();
        let mut clock: Scheduler<()> = Scheduler::new();
        let a = reg.add(tile(0));
        let b = reg.add(tile(1));
        assert_ne!(a, b);
        assert_eq!(reg.get(a).unwrap().state(), Lifecycle::Active);

        reg.clear(&mut clock);
        let c = reg.add(tile(0));
        assert!(c != a && c != b);
    }

    #[test]
    fn test_remove_cancels_timer() {
        let mut reg = ObjectRegistry::new();
        let mut clock = Scheduler::new();
        let id = reg.add(tile(3));
        let handle = reg.arm(id, &mut clock, 100, id).unwrap();
        assert!(clock.is_pending(handle));

        let removed = reg.remove(id, &mut clock).unwrap();
        assert_eq!(removed.state(), Lifecycle::Resolved);
        assert!(!clock.is_pending(handle));
        assert!(reg.remove(id, &mut clock).is_none());
    }

    #[test]
    fn test_rearm_replaces_timer() {
        let mut reg = ObjectRegistry::new();
        let mut clock = Scheduler::new();
        let id = reg.add(tile(0));
        let first = reg.arm(id, &mut clock, 100, ()).unwrap();
        let second = reg.arm(id, &mut clock, 100, ()).unwrap();
        assert!(!clock.is_pending(first));
        assert!(clock.is_pending(second));
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn test_grace_only_from_active() {
        let mut reg = ObjectRegistry::new();
        let mut clock = Scheduler::new();
        let id = reg.add(tile(0));
        let active_timer = reg.arm(id, &mut clock, 100, 1).unwrap();

        assert!(reg.begin_grace(id, &mut clock, 200, 2));
        assert!(!clock.is_pending(active_timer));
        let obj = reg.get(id).unwrap();
        assert_eq!(obj.state(), Lifecycle::Grace);
        assert!(!reg.is_current(id, active_timer, Lifecycle::Active));
        assert!(reg.is_current(id, obj.timer().unwrap(), Lifecycle::Grace));

        // Already in grace
        assert!(!reg.begin_grace(id, &mut clock, 200, 3));
        assert_eq!(reg.active_count(), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_disarm_keeps_objects() {
        let mut reg = ObjectRegistry::new();
        let mut clock = Scheduler::new();
        for cell in 0..3 {
            let id = reg.add(tile(cell));
            reg.arm(id, &mut clock, 500, ());
        }
        assert_eq!(clock.pending(), 3);
        reg.disarm_all(&mut clock);
        assert_eq!(clock.pending(), 0);
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.armed_count(), 0);
    }

    #[test]
    fn test_for_each_visits_in_id_order() {
        let mut reg = ObjectRegistry::new();
        let mut clock: Scheduler<()> = Scheduler::new();
        let a = reg.add(tile(4));
        let b = reg.add(tile(1));
        let c = reg.add(tile(9));
        reg.remove(b, &mut clock);

        let mut seen = Vec::new();
        reg.for_each(|o| seen.push((o.id, o.cell())));
        assert_eq!(seen, vec![(a, Some(4)), (c, Some(9))]);
    }

    #[test]
    fn test_in_cell() {
        let mut reg = ObjectRegistry::new();
        let id = reg.add(tile(7));
        assert_eq!(reg.in_cell(7), Some(id));
        assert_eq!(reg.in_cell(6), None);
    }
}
