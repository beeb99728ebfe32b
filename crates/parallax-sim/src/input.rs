//! Input source abstraction: where the per-tick action flags and
//! movement-reference axes come from.

use parallax_net::{TickInput, UserInput, ViewFrame};

/// Per-tick input poll consumed by the prediction core.
///
/// Implementations return the five action flags together with the
/// movement-reference orientation they were sampled against. The returned
/// [`TickInput`] is what gets recorded, transmitted, and replayed.
pub trait InputSource {
    /// Samples input for `tick`.
    fn poll(&mut self, tick: u64) -> TickInput;
}

/// Input source that plays back a fixed script of flags, one entry per tick,
/// against the world reference frame. Past the end of the script it returns
/// neutral input.
///
/// Used by tests and the headless demo.
pub struct ScriptedInput {
    script: Vec<TickInput>,
}

impl ScriptedInput {
    /// Plays back the given per-tick inputs.
    pub fn new(script: Vec<TickInput>) -> Self {
        Self { script }
    }

    /// Script that holds `flags` for `ticks` ticks in the world frame.
    pub fn hold(flags: UserInput, ticks: usize) -> Self {
        Self::new(vec![
            TickInput {
                flags,
                frame: ViewFrame::WORLD,
            };
            ticks
        ])
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> TickInput {
        self.script
            .get(tick as usize)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_then_neutral() {
        let forward = UserInput {
            forward: true,
            ..UserInput::default()
        };
        let mut source = ScriptedInput::hold(forward, 3);
        assert!(source.poll(0).flags.forward);
        assert!(source.poll(2).flags.forward);
        assert!(source.poll(3).flags.is_neutral());
        assert!(source.poll(1000).flags.is_neutral());
    }
}
