//! Fixed-timestep scheduling: variable frame time in, whole ticks out.

/// Fixed simulation tick rate shared by client and server.
pub const TICK_RATE: u32 = 64;

/// Duration of a single tick at [`TICK_RATE`], as the physics step size.
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;

/// Accumulates variable per-frame elapsed time and yields whole fixed-size
/// ticks, making the tick rate independent of the frame rate.
///
/// The accumulator is deliberately unclamped: a severe frame-time spike
/// produces an arbitrarily large burst of ticks in one call. Callers that
/// cannot tolerate that must bound their frame times upstream.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_dt: f64,
    accumulator: f64,
}

impl FixedTimestep {
    /// Creates a scheduler producing ticks of `tick_dt` seconds.
    pub fn new(tick_dt: f64) -> Self {
        Self {
            tick_dt,
            accumulator: 0.0,
        }
    }

    /// Adds `frame_dt` seconds of elapsed time and returns the number of
    /// whole ticks now due. The fractional remainder carries over.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        self.accumulator += frame_dt;
        let mut ticks = 0u32;
        while self.accumulator >= self.tick_dt {
            self.accumulator -= self.tick_dt;
            ticks += 1;
        }
        ticks
    }

    /// The configured tick duration in seconds.
    pub fn tick_dt(&self) -> f64 {
        self.tick_dt
    }

    /// Unconsumed fraction of a tick currently accumulated.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(f64::from(TICK_DT))
    }
}
