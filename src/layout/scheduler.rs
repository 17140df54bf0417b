//! Loops that drive a layout step by step.
//!
//! The engine never schedules itself. A driver calls
//! [`ForceDirected::step`] and keeps going while it returns
//! [`StepOutcome::Continue`]. On native targets [`run_blocking`] paces steps
//! by the configured tick interval; in the browser the host's timer plays
//! that role through the WASM facade.

use super::force_directed::{ForceDirected, StepOutcome};
use super::renderer::Renderer;
use crate::graph::GraphView;
use crate::vector::Vector;

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: usize,
    /// Whether the last step reported [`StepOutcome::Finished`].
    pub converged: bool,
}

/// Step until the layout finishes or `max_steps` have run, without pausing.
pub fn run_to_convergence<V: Vector, G: GraphView>(
    layout: &mut ForceDirected<V, G>,
    max_steps: usize,
) -> RunSummary {
    for steps in 1..=max_steps {
        if layout.step() == StepOutcome::Finished {
            return RunSummary {
                steps,
                converged: true,
            };
        }
    }

    tracing::debug!(max_steps, "step budget exhausted before convergence");
    RunSummary {
        steps: max_steps,
        converged: false,
    }
}

/// Start the layout with `renderer` and step it on the current thread,
/// sleeping one tick interval between steps, until it finishes.
///
/// Returns the number of steps run, or 0 if the layout was already running.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_blocking<V: Vector, G: GraphView>(
    layout: &mut ForceDirected<V, G>,
    renderer: Box<dyn Renderer>,
) -> usize {
    if !layout.start(renderer) {
        return 0;
    }

    let mut steps = 0;
    loop {
        steps += 1;
        if layout.step().is_finished() {
            return steps;
        }
        std::thread::sleep(layout.config().tick_interval());
    }
}
