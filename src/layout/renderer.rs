//! Notifications sent from the simulation to whoever draws it.

/// Receives frame and completion notifications from a running layout.
///
/// A renderer is bound by `start` and released when the run finishes, so
/// `on_converged` fires exactly once per run. Renderers read positions back
/// through the engine (`each_node`, `get_point`) rather than being handed them.
pub trait Renderer {
    /// A step completed and positions have moved.
    fn on_frame(&mut self);

    /// The run finished, by convergence or by an explicit stop.
    fn on_converged(&mut self);
}
