//! Preconditions checked when an actor interacts with a reactor core.

use std::sync::Arc;

use nether_reactor_catalog::StructureCatalog;
use nether_reactor_core::{
    Actor, Block, BlockPos, Event, MessageKey, ReactorPhase, Rejection, WorldAccess,
};

use crate::Reactor;

/// Outcome of an activation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The reactor started and its structure was built.
    Activated,
    /// The attempt was refused and nothing changed.
    Rejected(Rejection),
}

impl Activation {
    /// Message to show the interacting actor, if any.
    #[must_use]
    pub const fn message(self) -> Option<MessageKey> {
        match self {
            Self::Activated => Some(MessageKey::Active),
            Self::Rejected(reason) => reason.message(),
        }
    }
}

/// Decides whether an interaction with a core starts its reactor.
#[derive(Clone, Debug)]
pub struct ActivationGate {
    catalog: Arc<StructureCatalog>,
}

impl ActivationGate {
    /// Creates a gate validating against the shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<StructureCatalog>) -> Self {
        Self { catalog }
    }

    /// Runs every precondition in order without mutating anything.
    pub fn check<W>(&self, world: &W, anchor: BlockPos, actor: Option<&Actor>) -> Result<(), Rejection>
    where
        W: WorldAccess + ?Sized,
    {
        if world.block(anchor).reactor_phase() != Some(ReactorPhase::Inactive) {
            return Err(Rejection::NotInactive);
        }
        if !actor.is_some_and(Actor::has_finite_resources) {
            return Err(Rejection::NoFiniteResources);
        }
        if !self.catalog.is_valid_pattern(world, anchor) {
            return Err(Rejection::WrongPattern);
        }
        if anchor.y() + self.catalog.max_bound_y() >= world.max_y() {
            return Err(Rejection::BuildTooHigh);
        }
        if anchor.y() + self.catalog.min_bound_y() < world.min_y() {
            return Err(Rejection::BuildTooLow);
        }
        Ok(())
    }

    /// Activates `reactor` if every precondition holds.
    ///
    /// On success the reactor is initialized, the structure is built and the
    /// core switches to [`ReactorPhase::Active`].
    pub fn try_activate<W>(
        &self,
        world: &mut W,
        reactor: &mut Reactor,
        actor: Option<&Actor>,
        out_events: &mut Vec<Event>,
    ) -> Activation
    where
        W: WorldAccess + ?Sized,
    {
        let anchor = reactor.anchor();
        if let Err(reason) = self.check(world, anchor, actor) {
            tracing::debug!(
                %anchor,
                ?reason,
                game_mode = ?actor.map(Actor::game_mode),
                "reactor activation rejected"
            );
            out_events.push(Event::ActivationRejected { anchor, reason });
            return Activation::Rejected(reason);
        }

        reactor.initialize(world);
        self.catalog.build(world, anchor);
        world.set_block(anchor, Block::reactor_core(ReactorPhase::Active));
        tracing::info!(%anchor, "nether reactor activated");
        out_events.push(Event::ReactorActivated { anchor });
        Activation::Activated
    }
}
