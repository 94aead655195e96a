//! Accelerated sunset applied while a reactor runs.

/// Time of day at which the reactor stops forwarding the clock.
pub const TIME_NIGHT: i64 = 15_000;

/// Clock ticks skipped per reactor tick until night falls.
pub const TIME_STEP_PER_TICK: i64 = 25;

/// One step of the accelerated sunset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayStep {
    /// Ticks added to the world clock.
    pub ticks: i64,
    /// The step lands exactly on [`TIME_NIGHT`].
    pub reaches_night: bool,
}

/// Computes how far the clock moves from `time_of_day`.
///
/// The step is clamped so that it never overshoots [`TIME_NIGHT`] when
/// approaching it from earlier in the day. Landing exactly on
/// [`TIME_NIGHT`], or already standing on it, counts as reaching it.
#[must_use]
pub fn forward_step(time_of_day: i64) -> DayStep {
    if time_of_day <= TIME_NIGHT {
        let remaining = TIME_NIGHT - time_of_day;
        if remaining <= TIME_STEP_PER_TICK {
            return DayStep {
                ticks: remaining,
                reaches_night: true,
            };
        }
    }
    DayStep {
        ticks: TIME_STEP_PER_TICK,
        reaches_night: false,
    }
}
