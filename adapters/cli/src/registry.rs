//! Reactors hosted by the command-line world.

use std::collections::BTreeMap;

use nether_reactor_core::{BlockPos, CreatureFactory, Event, WorldAccess};
use nether_reactor_system_reactor::Reactor;
use rand::Rng;

/// Reactors known to the host, keyed by core position.
#[derive(Debug, Default)]
pub(crate) struct ReactorRegistry {
    reactors: BTreeMap<BlockPos, Reactor>,
}

impl ReactorRegistry {
    pub(crate) fn insert(&mut self, reactor: Reactor) {
        let _ = self.reactors.insert(reactor.anchor(), reactor);
    }

    pub(crate) fn get(&self, anchor: BlockPos) -> Option<&Reactor> {
        self.reactors.get(&anchor)
    }

    pub(crate) fn get_mut(&mut self, anchor: BlockPos) -> Option<&mut Reactor> {
        self.reactors.get_mut(&anchor)
    }

    pub(crate) fn any_running(&self) -> bool {
        self.reactors.values().any(Reactor::is_running)
    }

    /// Routes due block updates to the reactor owning the cell.
    pub(crate) fn dispatch<W, R>(
        &mut self,
        world: &mut W,
        events: &[Event],
        rng: &mut R,
        creatures: Option<&dyn CreatureFactory>,
        out_events: &mut Vec<Event>,
    ) where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        for event in events {
            let Event::ScheduledUpdate { pos } = event else {
                continue;
            };
            if let Some(reactor) = self.reactors.get_mut(pos) {
                tracing::debug!(anchor = %pos, "scheduled update routed");
                let _ = reactor.on_scheduled_update(world, *pos, rng, creatures, out_events);
            }
        }
    }
}
