#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reactor state machine driving a nether reactor from activation to decay.
//!
//! A [`Reactor`] is created for every placed core. The [`ActivationGate`]
//! decides whether an interaction starts it; afterwards the host forwards
//! the reactor's scheduled block updates to [`Reactor::on_scheduled_update`]
//! once per tick until the countdown completes.

use std::sync::Arc;

use nether_reactor_catalog::StructureCatalog;
use nether_reactor_core::{
    Block, BlockPos, CreatureFactory, Event, ReactorPhase, WorldAccess,
};
use nether_reactor_system_rounds::RoundScheduler;
use rand::Rng;

mod gate;
mod state;
mod time;

pub use gate::{Activation, ActivationGate};
pub use state::ReactorState;
pub use time::{forward_step, DayStep, TIME_NIGHT, TIME_STEP_PER_TICK};

/// Number of progress ticks a reactor runs before it finishes.
pub const DURATION: i16 = 920;

/// Delay between two consecutive advances.
const ADVANCE_DELAY: u32 = 1;

/// Progress and lifecycle of one reactor core.
#[derive(Clone, Debug)]
pub struct Reactor {
    anchor: BlockPos,
    catalog: Arc<StructureCatalog>,
    rounds: RoundScheduler,
    state: ReactorState,
    turned_night: bool,
}

impl Reactor {
    /// Creates an idle reactor for the core at `anchor`.
    #[must_use]
    pub fn new(anchor: BlockPos, catalog: Arc<StructureCatalog>) -> Self {
        Self::restore(anchor, catalog, ReactorState::default())
    }

    /// Recreates a reactor from persisted state without touching the world.
    ///
    /// Call [`Reactor::resume`] once the world is available to reschedule a
    /// running reactor.
    #[must_use]
    pub fn restore(anchor: BlockPos, catalog: Arc<StructureCatalog>, state: ReactorState) -> Self {
        let rounds = RoundScheduler::new(Arc::clone(&catalog));
        Self {
            anchor,
            catalog,
            rounds,
            state,
            turned_night: true,
        }
    }

    /// Reschedules the next advance if the restored reactor is running.
    ///
    /// Time forwarding is not resumed: the night flag is not persisted.
    pub fn resume<W>(&self, world: &mut W)
    where
        W: WorldAccess + ?Sized,
    {
        if self.is_running() {
            tracing::debug!(anchor = %self.anchor, progress = self.state.progress, "reactor resumed");
            world.schedule_delayed_update(self.anchor, ADVANCE_DELAY);
        }
    }

    /// Position of the reactor core.
    #[must_use]
    pub const fn anchor(&self) -> BlockPos {
        self.anchor
    }

    /// Snapshot of the persisted fields.
    #[must_use]
    pub const fn state(&self) -> ReactorState {
        self.state
    }

    /// Ticks processed since activation.
    #[must_use]
    pub const fn progress(&self) -> i16 {
        self.state.progress
    }

    /// Reports whether the reactor is counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Reports whether the reactor completed its countdown.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Reports whether time forwarding already reached night.
    #[must_use]
    pub const fn has_turned_night(&self) -> bool {
        self.turned_night
    }

    /// Starts the countdown and schedules the first advance.
    pub fn initialize<W>(&mut self, world: &mut W)
    where
        W: WorldAccess + ?Sized,
    {
        self.state.initialized = true;
        self.turned_night = false;
        world.schedule_delayed_update(self.anchor, ADVANCE_DELAY);
    }

    /// Handles a due block update, advancing the reactor if it targets the core.
    ///
    /// Returns `true` when the update belonged to this reactor.
    pub fn on_scheduled_update<W, R>(
        &mut self,
        world: &mut W,
        pos: BlockPos,
        rng: &mut R,
        creatures: Option<&dyn CreatureFactory>,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        if pos != self.anchor || !self.is_running() {
            return false;
        }
        let _ = self.advance(world, rng, creatures, out_events);
        true
    }

    /// Processes one tick of the countdown, returning whether it still runs.
    pub fn advance<W, R>(
        &mut self,
        world: &mut W,
        rng: &mut R,
        creatures: Option<&dyn CreatureFactory>,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.is_running() {
            return false;
        }

        if !self.turned_night {
            self.forward_time(world, out_events);
        }

        if let Ok(tick) = u32::try_from(self.state.progress) {
            self.apply_transformations(world, tick, out_events);
            let _ = self
                .rounds
                .fire_due(tick, world, self.anchor, rng, creatures, out_events);
        }

        if self.state.progress >= DURATION {
            self.finish(world, rng, out_events);
        }
        self.state.progress = self.state.progress.saturating_add(1);

        if self.is_running() {
            world.schedule_delayed_update(self.anchor, ADVANCE_DELAY);
        }
        self.is_running()
    }

    /// Ends the countdown, marks the core used and decays the spire.
    pub fn finish<W, R>(&mut self, world: &mut W, rng: &mut R, out_events: &mut Vec<Event>)
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        self.state.finished = true;
        world.set_block(self.anchor, Block::reactor_core(ReactorPhase::Used));
        tracing::info!(anchor = %self.anchor, "nether reactor finished");
        out_events.push(Event::ReactorFinished {
            anchor: self.anchor,
        });

        let removed = self.catalog.corrupt_spire(world, self.anchor, rng);
        out_events.push(Event::SpireCorrupted {
            anchor: self.anchor,
            removed,
        });
    }

    fn forward_time<W>(&mut self, world: &mut W, out_events: &mut Vec<Event>)
    where
        W: WorldAccess + ?Sized,
    {
        let step = forward_step(world.time_of_day());
        world.set_time(world.time().saturating_add(step.ticks));
        if step.reaches_night {
            self.turned_night = true;
            let time_of_day = world.time_of_day();
            tracing::debug!(anchor = %self.anchor, time_of_day, "night fell");
            out_events.push(Event::NightFell {
                anchor: self.anchor,
                time_of_day,
            });
        }
    }

    fn apply_transformations<W>(&self, world: &mut W, tick: u32, out_events: &mut Vec<Event>)
    where
        W: WorldAccess + ?Sized,
    {
        for (index, layer) in self.catalog.pattern_layers().iter().enumerate() {
            for transformation in layer.transformations_at(tick) {
                layer.apply_transformation(world, self.anchor, transformation);
                tracing::debug!(
                    anchor = %self.anchor,
                    layer = index,
                    material = %transformation.material(),
                    tick,
                    "pattern layer transformed"
                );
                out_events.push(Event::LayerTransformed {
                    anchor: self.anchor,
                    layer: index,
                    material: transformation.material(),
                });
            }
        }
    }
}
