//! ForceDirected - spring-electrical layout simulation.
//!
//! Every node is simulated as a charged [`Point`] and every edge as a
//! [`Spring`]. One step runs these phases, in order, over the whole graph:
//!
//! 1. **Repulsion:** Coulomb-like push between every unordered pair of points.
//! 2. **Attraction:** Hooke's-law pull along every edge's spring.
//! 3. **Centering:** weak pull of every point toward the origin.
//! 4. **Velocity:** integrate acceleration, apply damping, clear acceleration.
//! 5. **Position:** integrate velocity.
//! 6. **Render:** notify the bound renderer that a frame is ready.
//! 7. **Convergence:** finish when stopped or when total kinetic energy drops
//!    below the threshold.
//!
//! Points and springs are created lazily the first time a node or edge is
//! seen and are never pruned. Repulsion is all-pairs, O(n^2) per step.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::bounds::BoundingBox;
use super::config::LayoutConfig;
use super::point::{Point, PointHandle};
use super::renderer::Renderer;
use super::spring::Spring;
use crate::error::{LayoutResult, ensure_non_negative, ensure_positive};
use crate::graph::{EdgeData, EdgeEnds, EdgeId, Graph, GraphView, NodeData, NodeId};
use crate::vector::{Vector, Vector2, Vector3};

/// Added to every pairwise distance so coincident points stay finite.
const DISTANCE_EPSILON: f32 = 0.1;

/// Centering strength is the repulsion constant divided by this.
const CENTERING_DIVISOR: f32 = 50.0;

/// What the scheduler should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Energy is still above threshold; schedule another step.
    Continue,
    /// The run is over (converged or stopped); do not re-arm.
    Finished,
}

impl StepOutcome {
    pub fn is_finished(self) -> bool {
        self == StepOutcome::Finished
    }
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearest<V> {
    pub node: NodeId,
    /// Snapshot of the node's point at query time.
    pub point: Point<V>,
    pub distance: f32,
}

/// The layout simulation engine.
///
/// Owns the graph it lays out along with the point and spring caches. The
/// graph may be mutated between steps through [`ForceDirected::graph_mut`].
pub struct ForceDirected<V, G = Graph> {
    graph: G,
    config: LayoutConfig,

    /// Point cache. Points are never removed, so handles stay valid.
    points: Vec<Point<V>>,
    /// Node identity to slot in `points`.
    point_index: HashMap<NodeId, PointHandle>,
    /// Springs for edges that own their point pair. Parallel edges get a
    /// degenerate spring resolved on every lookup instead.
    springs: HashMap<EdgeId, Spring>,

    rng: StdRng,
    running: bool,
    stop_requested: bool,
    renderer: Option<Box<dyn Renderer>>,
}

/// Planar layout.
pub type ForceDirected2D<G = Graph> = ForceDirected<Vector2, G>;

/// Spatial layout.
pub type ForceDirected3D<G = Graph> = ForceDirected<Vector3, G>;

impl<V: Vector, G: GraphView> ForceDirected<V, G> {
    /// Create an engine for `graph`, rejecting invalid parameters.
    pub fn new(graph: G, config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            graph,
            config,
            points: Vec::new(),
            point_index: HashMap::new(),
            springs: HashMap::new(),
            rng,
            running: false,
            stop_requested: false,
            renderer: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Mutable access to the graph. Only call between steps.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_threshold(&mut self, threshold: f32) -> LayoutResult<()> {
        ensure_non_negative("threshold", threshold)?;
        self.config.threshold = threshold;
        Ok(())
    }

    pub fn set_physics_time_step(&mut self, dt: f32) -> LayoutResult<()> {
        ensure_positive("physics_time_step", dt)?;
        self.config.physics_time_step = dt;
        Ok(())
    }

    pub fn set_tick_interval(&mut self, tick_interval_ms: u32) {
        self.config.tick_interval_ms = tick_interval_ms;
    }

    /// Cached point for a node, without creating one.
    pub fn point(&self, node: NodeId) -> Option<&Point<V>> {
        self.point_index.get(&node).map(|&h| &self.points[h.0])
    }

    /// Point behind a handle, e.g. one end of a [`Spring`].
    ///
    /// Handles do not survive [`ForceDirected::reset`]; a stale one yields
    /// `None` (or a newer point that reused its slot).
    pub fn point_at(&self, handle: PointHandle) -> Option<&Point<V>> {
        self.points.get(handle.0)
    }

    /// Number of points created so far, including stale ones.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    // =========================================================================
    // Point and Spring Caches
    // =========================================================================

    /// Drop every cached point and spring.
    ///
    /// Needed when the graph hands out identifiers again from zero, e.g.
    /// after [`Graph::clear`].
    pub fn reset(&mut self) {
        self.points.clear();
        self.point_index.clear();
        self.springs.clear();
    }

    /// The point for `node`, created at a random position on first access.
    pub fn get_point(&mut self, node: NodeId) -> &Point<V> {
        let handle = self.point_handle(node);
        &self.points[handle.0]
    }

    fn point_handle(&mut self, node: NodeId) -> PointHandle {
        if let Some(&handle) = self.point_index.get(&node) {
            return handle;
        }

        let mass = match self.graph.node_data(node) {
            Some(data) => data.mass,
            None => {
                tracing::warn!(%node, "node has no data, using default mass");
                NodeData::default().mass
            }
        };
        let handle = PointHandle(self.points.len());
        self.points.push(Point::new(V::random(&mut self.rng), mass));
        self.point_index.insert(node, handle);
        handle
    }

    /// The spring for `edge`.
    ///
    /// The first edge seen between two nodes gets a spring with the edge's
    /// rest length and the configured stiffness. Any other edge between the
    /// same nodes gets a zero-force spring over the same point pair: edges in
    /// the same direction are searched first, then edges in the opposite
    /// direction (whose point order is flipped). The first cached spring found
    /// wins.
    pub fn get_spring(&mut self, edge: EdgeEnds) -> Spring {
        if let Some(&spring) = self.springs.get(&edge.id) {
            return spring;
        }

        if let Some(existing) = self.find_spring(edge.source, edge.target) {
            return Spring::degenerate(existing.point1, existing.point2);
        }
        if let Some(existing) = self.find_spring(edge.target, edge.source) {
            return Spring::degenerate(existing.point2, existing.point1);
        }

        let length = match self.graph.edge_data(edge.id) {
            Some(data) => data.length,
            None => {
                tracing::warn!(edge = %edge.id, "edge has no data, using default length");
                EdgeData::default().length
            }
        };
        let point1 = self.point_handle(edge.source);
        let point2 = self.point_handle(edge.target);
        let spring = Spring::new(point1, point2, length, self.config.stiffness);
        tracing::debug!(edge = %edge.id, length, "created spring");
        self.springs.insert(edge.id, spring);
        spring
    }

    /// First cached spring among the edges from `source` to `target`.
    fn find_spring(&self, source: NodeId, target: NodeId) -> Option<Spring> {
        self.graph
            .edges_between(source, target)
            .into_iter()
            .find_map(|id| self.springs.get(&id).copied())
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Bind a renderer and mark the simulation as running.
    ///
    /// Returns `false`, leaving everything untouched, if already running.
    pub fn start(&mut self, renderer: Box<dyn Renderer>) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.stop_requested = false;
        self.renderer = Some(renderer);
        tracing::debug!("layout started");
        true
    }

    /// Ask the simulation to finish at the end of the next step.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        tracing::debug!("layout stop requested");
    }

    /// Run one full simulation step.
    pub fn step(&mut self) -> StepOutcome {
        let nodes: Vec<NodeId> = self.graph.nodes().collect();
        let handles: Vec<PointHandle> = nodes
            .into_iter()
            .map(|node| self.point_handle(node))
            .collect();

        self.apply_coulombs_law(&handles);
        self.apply_hookes_law();
        self.attract_to_centre(&handles);
        self.update_velocity(&handles);
        self.update_position(&handles);

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.on_frame();
        }

        let energy = self.energy_of(&handles);
        tracing::trace!(energy, "step");

        if self.stop_requested || energy < self.config.threshold {
            self.running = false;
            tracing::debug!(energy, stopped = self.stop_requested, "layout finished");
            if let Some(mut renderer) = self.renderer.take() {
                renderer.on_converged();
            }
            StepOutcome::Finished
        } else {
            StepOutcome::Continue
        }
    }

    fn apply_coulombs_law(&mut self, handles: &[PointHandle]) {
        let repulsion = self.config.repulsion;
        for (i, &a) in handles.iter().enumerate() {
            for &b in &handles[i + 1..] {
                let d = self.points[a.0].position - self.points[b.0].position;
                let distance = d.magnitude() + DISTANCE_EPSILON;
                let direction = d.normalize();
                let force = direction * repulsion / (distance * distance * 0.5);

                self.points[a.0].apply_force(force);
                self.points[b.0].apply_force(-force);
            }
        }
    }

    fn apply_hookes_law(&mut self) {
        let edges: Vec<EdgeEnds> = self.graph.edges().collect();
        for edge in edges {
            let spring = self.get_spring(edge);
            let d = self.points[spring.point2.0].position - self.points[spring.point1.0].position;
            let displacement = spring.length - d.magnitude();
            let direction = d.normalize();
            let force = direction * (spring.k * displacement * -0.5);

            self.points[spring.point1.0].apply_force(force);
            self.points[spring.point2.0].apply_force(-force);
        }
    }

    fn attract_to_centre(&mut self, handles: &[PointHandle]) {
        let strength = self.config.repulsion / CENTERING_DIVISOR;
        for &h in handles {
            let point = &mut self.points[h.0];
            let force = -point.position * strength;
            point.apply_force(force);
        }
    }

    fn update_velocity(&mut self, handles: &[PointHandle]) {
        let (dt, damping) = (self.config.physics_time_step, self.config.damping);
        for &h in handles {
            self.points[h.0].integrate_velocity(dt, damping);
        }
    }

    fn update_position(&mut self, handles: &[PointHandle]) {
        let dt = self.config.physics_time_step;
        for &h in handles {
            self.points[h.0].integrate_position(dt);
        }
    }

    fn energy_of(&self, handles: &[PointHandle]) -> f32 {
        handles
            .iter()
            .map(|h| self.points[h.0].kinetic_energy())
            .sum()
    }

    /// Total kinetic energy of the current nodes' points.
    ///
    /// Nodes without a point yet contribute nothing.
    pub fn total_energy(&self) -> f32 {
        self.graph
            .nodes()
            .filter_map(|node| self.point(node))
            .map(Point::kinetic_energy)
            .sum()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Visit every node with its point, in graph order.
    pub fn each_node(&mut self, mut visit: impl FnMut(NodeId, &Point<V>)) {
        let nodes: Vec<NodeId> = self.graph.nodes().collect();
        for node in nodes {
            let handle = self.point_handle(node);
            visit(node, &self.points[handle.0]);
        }
    }

    /// Visit every edge with its spring, in graph order.
    pub fn each_edge(&mut self, mut visit: impl FnMut(EdgeEnds, &Spring)) {
        let edges: Vec<EdgeEnds> = self.graph.edges().collect();
        for edge in edges {
            let spring = self.get_spring(edge);
            visit(edge, &spring);
        }
    }

    /// The node closest to `position`.
    ///
    /// Ties go to the node seen first. Returns `None` for an empty graph.
    pub fn nearest(&mut self, position: V) -> Option<Nearest<V>> {
        let mut best: Option<(NodeId, PointHandle, f32)> = None;
        let nodes: Vec<NodeId> = self.graph.nodes().collect();
        for node in nodes {
            let handle = self.point_handle(node);
            let distance = (self.points[handle.0].position - position).magnitude();
            if best.is_none_or(|(_, _, min)| distance < min) {
                best = Some((node, handle, distance));
            }
        }

        best.map(|(node, handle, distance)| Nearest {
            node,
            point: self.points[handle.0].clone(),
            distance,
        })
    }

    /// Padded box around every node's current position.
    pub fn bounding_box(&mut self) -> BoundingBox<V> {
        let nodes: Vec<NodeId> = self.graph.nodes().collect();
        let positions: Vec<V> = nodes
            .into_iter()
            .map(|node| {
                let handle = self.point_handle(node);
                self.points[handle.0].position
            })
            .collect();
        BoundingBox::enclosing(positions)
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, node: NodeId, position: V) {
        let handle = self.point_handle(node);
        self.points[handle.0].position = position;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::LayoutError;

    #[derive(Debug, Default)]
    struct Events {
        frames: usize,
        converged: usize,
    }

    struct Recorder(Rc<RefCell<Events>>);

    impl Renderer for Recorder {
        fn on_frame(&mut self) {
            self.0.borrow_mut().frames += 1;
        }

        fn on_converged(&mut self) {
            self.0.borrow_mut().converged += 1;
        }
    }

    fn recorder() -> (Box<dyn Renderer>, Rc<RefCell<Events>>) {
        let events = Rc::new(RefCell::new(Events::default()));
        (Box::new(Recorder(events.clone())), events)
    }

    fn seeded() -> LayoutConfig {
        LayoutConfig::default().with_seed(42)
    }

    fn pair_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node();
        let b = graph.add_node();
        (graph, a, b)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = LayoutConfig::new(400.0, 400.0, 1.5);
        let result = ForceDirected2D::new(Graph::new(), config);
        assert!(matches!(result, Err(LayoutError::InvalidConfig { .. })));
    }

    #[test]
    fn test_get_point_is_lazy_and_cached() {
        let mut graph = Graph::new();
        let heavy = graph.add_node_with(NodeData::with_mass(5.0));
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        assert!(layout.point(heavy).is_none());
        let first = layout.get_point(heavy).clone();
        assert_eq!(first.mass(), 5.0);
        assert_eq!(first.velocity(), Vector2::zero());
        assert_eq!(first.acceleration(), Vector2::zero());

        let second = layout.get_point(heavy).clone();
        assert_eq!(first, second);
        assert_eq!(layout.point_count(), 1);
    }

    #[test]
    fn test_get_spring_is_cached() {
        let (mut graph, a, b) = pair_graph();
        let id = graph
            .add_edge_with(a, b, EdgeData::with_length(3.0))
            .unwrap();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        let edge = EdgeEnds {
            id,
            source: a,
            target: b,
        };
        let first = layout.get_spring(edge);
        let second = layout.get_spring(edge);

        assert_eq!(first, second);
        assert_eq!(first.length, 3.0);
        assert_eq!(first.k, 400.0);
        assert_eq!(layout.point_at(first.point1), layout.point(a));
        assert_eq!(layout.point_at(first.point2), layout.point(b));
    }

    #[test]
    fn test_parallel_edges_share_points() {
        let (mut graph, a, b) = pair_graph();
        let e0 = graph.add_edge(a, b).unwrap();
        let e1 = graph.add_edge(a, b).unwrap();
        let e2 = graph.add_edge(b, a).unwrap();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        let ends = |id, source, target| EdgeEnds { id, source, target };
        let s0 = layout.get_spring(ends(e0, a, b));
        let s1 = layout.get_spring(ends(e1, a, b));
        let s2 = layout.get_spring(ends(e2, b, a));

        assert!(!s0.is_degenerate());
        assert!(s1.is_degenerate());
        assert!(s2.is_degenerate());
        assert_eq!(s1.length, 0.0);

        // Same direction keeps the orientation, opposite direction flips it.
        assert_eq!((s1.point1, s1.point2), (s0.point1, s0.point2));
        assert_eq!((s2.point1, s2.point2), (s0.point2, s0.point1));
    }

    #[test]
    fn test_reverse_edge_first_owns_spring() {
        let (mut graph, a, b) = pair_graph();
        let forward = graph.add_edge(a, b).unwrap();
        let backward = graph.add_edge(b, a).unwrap();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        let owner = layout.get_spring(EdgeEnds {
            id: backward,
            source: b,
            target: a,
        });
        let alias = layout.get_spring(EdgeEnds {
            id: forward,
            source: a,
            target: b,
        });

        assert!(!owner.is_degenerate());
        assert!(alias.is_degenerate());
        assert_eq!((alias.point1, alias.point2), (owner.point2, owner.point1));
    }

    #[test]
    fn test_each_edge_visits_every_edge() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        let mut real = 0;
        let mut visited = Vec::new();
        layout.each_edge(|edge, spring| {
            visited.push(edge.id);
            if !spring.is_degenerate() {
                real += 1;
            }
        });

        assert_eq!(visited, vec![EdgeId(0), EdgeId(1), EdgeId(2)]);
        assert_eq!(real, 1);
    }

    #[test]
    fn test_repulsion_is_equal_and_opposite() {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..4).map(|_| graph.add_node()).collect();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.place(nodes[0], Vector2::new(0.0, 0.0));
        layout.place(nodes[1], Vector2::new(1.0, 2.0));
        layout.place(nodes[2], Vector2::new(-3.0, 0.5));
        layout.place(nodes[3], Vector2::new(0.0, 0.0));

        for i in 0..4 {
            for j in (i + 1)..4 {
                let a = layout.point_index[&nodes[i]];
                let b = layout.point_index[&nodes[j]];
                for p in &mut layout.points {
                    p.acceleration = Vector2::zero();
                }

                layout.apply_coulombs_law(&[a, b]);
                let fa = layout.points[a.0].acceleration() * layout.points[a.0].mass();
                let fb = layout.points[b.0].acceleration() * layout.points[b.0].mass();
                assert_eq!(fa, -fb);
            }
        }
    }

    #[test]
    fn test_coincident_points_stay_finite() {
        let (graph, a, b) = pair_graph();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.place(a, Vector2::new(1.0, 1.0));
        layout.place(b, Vector2::new(1.0, 1.0));

        layout.step();

        let pa = layout.point(a).unwrap().position();
        assert!(pa.x.is_finite() && pa.y.is_finite());
    }

    #[test]
    fn test_degenerate_springs_add_no_force() {
        let build = |extra_parallel: bool| {
            let (mut graph, a, b) = pair_graph();
            let c = graph.add_node();
            graph.add_edge(a, b);
            graph.add_edge(b, c);
            if extra_parallel {
                graph.add_edge(a, b);
                graph.add_edge(b, a);
            }
            ForceDirected2D::new(graph, seeded()).unwrap()
        };

        let mut single = build(false);
        let mut multi = build(true);
        for _ in 0..25 {
            single.step();
            multi.step();
        }

        for raw in 0..3 {
            let node = NodeId(raw);
            assert_eq!(
                single.point(node).unwrap().position(),
                multi.point(node).unwrap().position()
            );
        }
    }

    #[test]
    fn test_single_node_pulled_to_centre() {
        let mut graph = Graph::new();
        let only = graph.add_node();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.place(only, Vector2::new(4.0, -3.0));

        let before = layout.point(only).unwrap().position().magnitude();
        for _ in 0..10 {
            layout.step();
        }
        let after = layout.point(only).unwrap().position().magnitude();

        assert!(after < before, "{after} should be less than {before}");
    }

    #[test]
    fn test_acceleration_cleared_every_step() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected3D::new(graph, seeded()).unwrap();

        layout.step();
        layout.each_node(|_, point| assert_eq!(point.acceleration(), Vector3::zero()));
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (graph, _, _) = pair_graph();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        let (first, first_events) = recorder();
        let (second, second_events) = recorder();

        assert!(layout.start(first));
        assert!(!layout.start(second));
        assert!(layout.is_running());

        layout.step();
        assert_eq!(first_events.borrow().frames, 1);
        assert_eq!(second_events.borrow().frames, 0);
    }

    #[test]
    fn test_stop_before_step_finishes_next_step() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        let (renderer, events) = recorder();

        layout.start(renderer);
        layout.stop();
        assert!(layout.is_running());

        assert_eq!(layout.step(), StepOutcome::Finished);
        assert!(!layout.is_running());
        assert_eq!(events.borrow().frames, 1);
        assert_eq!(events.borrow().converged, 1);

        // The renderer is released; later manual steps do not notify it again.
        layout.step();
        assert_eq!(events.borrow().frames, 1);
        assert_eq!(events.borrow().converged, 1);
    }

    #[test]
    fn test_restart_clears_stop_flag() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.set_threshold(0.0).unwrap();

        let (renderer, _) = recorder();
        layout.start(renderer);
        layout.stop();
        layout.step();

        let (renderer, events) = recorder();
        assert!(layout.start(renderer));
        assert_eq!(layout.step(), StepOutcome::Continue);
        assert!(layout.is_running());
        assert_eq!(events.borrow().converged, 0);
    }

    #[test]
    fn test_pair_converges() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge_with(a, b, EdgeData::with_length(1.0));
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        let (renderer, events) = recorder();
        layout.start(renderer);

        let mut steps = 0;
        while layout.step() == StepOutcome::Continue {
            steps += 1;
            assert!(steps < 5_000, "layout did not converge");
        }

        assert!(layout.total_energy() < layout.config().threshold);
        assert_eq!(events.borrow().converged, 1);
        assert_eq!(events.borrow().frames, steps + 1);

        let pa = layout.point(a).unwrap().position();
        let pb = layout.point(b).unwrap().position();
        let separation = (pa - pb).magnitude();
        let expected = pair_balance(&LayoutConfig::default(), 1.0);
        assert!(
            (separation - expected).abs() < 0.05,
            "separation {separation}, expected {expected}"
        );
    }

    /// Separation at which two unit-mass points joined by one spring of rest
    /// length `length`, placed symmetrically about the origin, feel no net
    /// force: repulsion outward, spring and centering inward.
    fn pair_balance(config: &LayoutConfig, length: f32) -> f32 {
        let centering = config.repulsion / CENTERING_DIVISOR;
        let net_inward = |r: f32| {
            let d = r + DISTANCE_EPSILON;
            config.stiffness * (r - length) * 0.5 + centering * r * 0.5
                - config.repulsion / (d * d * 0.5)
        };

        let (mut lo, mut hi) = (0.0_f32, 100.0_f32);
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            if net_inward(mid) > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        0.5 * (lo + hi)
    }

    #[test]
    fn test_energy_does_not_rise_near_equilibrium() {
        let mut graph = Graph::new();
        let chain: Vec<NodeId> = (0..5).map(|_| graph.add_node()).collect();
        for w in chain.windows(2) {
            graph.add_edge(w[0], w[1]);
        }
        let config = LayoutConfig::default().with_seed(4);
        let mut layout = ForceDirected2D::new(graph, config).unwrap();

        for _ in 0..200 {
            layout.step();
        }

        let mut previous = layout.total_energy();
        for step in 0..200 {
            layout.step();
            let energy = layout.total_energy();
            assert!(
                energy <= previous * 1.001 + 1e-9,
                "energy rose at step {step}: {previous} -> {energy}"
            );
            previous = energy;
        }
    }

    #[test]
    fn test_set_threshold_validates() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();

        for bad in [f32::NAN, -0.5, f32::INFINITY] {
            assert!(matches!(
                layout.set_threshold(bad),
                Err(LayoutError::InvalidConfig { field: "threshold", .. })
            ));
        }
        assert_eq!(layout.config().threshold, 0.01);

        // A rejected value must not keep the run from finishing.
        let (renderer, events) = recorder();
        layout.start(renderer);
        let mut steps = 0;
        while layout.step() == StepOutcome::Continue {
            steps += 1;
            assert!(steps < 5_000, "layout did not converge");
        }
        assert_eq!(events.borrow().converged, 1);

        assert!(layout.set_threshold(0.0).is_ok());
        assert_eq!(layout.config().threshold, 0.0);
    }

    #[test]
    fn test_point_handles_do_not_survive_reset() {
        let (mut graph, a, b) = pair_graph();
        let edge = graph.add_edge(a, b).unwrap();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        let spring = layout.get_spring(EdgeEnds {
            id: edge,
            source: a,
            target: b,
        });
        assert!(layout.point_at(spring.point2).is_some());

        layout.reset();
        assert!(layout.point_at(spring.point1).is_none());
        assert!(layout.point_at(spring.point2).is_none());
    }

    #[test]
    fn test_nearest() {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..3).map(|_| graph.add_node()).collect();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.place(nodes[0], Vector2::new(5.0, 5.0));
        layout.place(nodes[1], Vector2::new(3.0, 4.0));
        layout.place(nodes[2], Vector2::new(-1.0, -1.0));

        let nearest = layout.nearest(Vector2::zero()).unwrap();
        assert_eq!(nearest.node, nodes[2]);
        assert!((nearest.distance - 2.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(nearest.point.position(), Vector2::new(-1.0, -1.0));
    }

    #[test]
    fn test_nearest_exact_hit_and_ties() {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..3).map(|_| graph.add_node()).collect();
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.place(nodes[0], Vector2::new(1.0, 0.0));
        layout.place(nodes[1], Vector2::new(-1.0, 0.0));
        layout.place(nodes[2], Vector2::new(0.0, 0.0));

        let hit = layout.nearest(Vector2::zero()).unwrap();
        assert_eq!(hit.node, nodes[2]);
        assert_eq!(hit.distance, 0.0);

        // nodes[0] and nodes[1] are equidistant from (0, 5); first seen wins.
        layout.place(nodes[2], Vector2::new(0.0, -50.0));
        let tie = layout.nearest(Vector2::new(0.0, 5.0)).unwrap();
        assert_eq!(tie.node, nodes[0]);
    }

    #[test]
    fn test_nearest_empty_graph() {
        let mut layout = ForceDirected2D::new(Graph::new(), seeded()).unwrap();
        assert!(layout.nearest(Vector2::zero()).is_none());
    }

    #[test]
    fn test_bounding_box_encloses_points() {
        let mut graph = Graph::new();
        for _ in 0..6 {
            graph.add_node();
        }
        let mut layout = ForceDirected3D::new(graph, seeded()).unwrap();
        for _ in 0..5 {
            layout.step();
        }

        let bounds = layout.bounding_box();
        let default = BoundingBox::<Vector3>::enclosing([]);
        assert!(bounds.contains(default.min) && bounds.contains(default.max));
        layout.each_node(|_, point| assert!(bounds.contains(point.position())));
    }

    #[test]
    fn test_removed_nodes_keep_stale_points() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.step();

        layout.graph_mut().remove_node(a);
        let c = layout.graph_mut().add_node();
        layout.step();

        assert!(layout.point(a).is_some());
        assert!(layout.point(c).is_some());
        assert_eq!(layout.point_count(), 3);

        let mut seen = Vec::new();
        layout.each_node(|node, _| seen.push(node));
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains(&a));
    }

    #[test]
    fn test_reset_after_graph_clear() {
        let (mut graph, a, b) = pair_graph();
        graph.add_edge(a, b);
        let mut layout = ForceDirected2D::new(graph, seeded()).unwrap();
        layout.step();

        layout.graph_mut().clear();
        layout.reset();
        assert_eq!(layout.point_count(), 0);

        let heavy = layout.graph_mut().add_node_with(NodeData::with_mass(9.0));
        assert_eq!(heavy, a);
        assert_eq!(layout.get_point(heavy).mass(), 9.0);
    }

    #[test]
    fn test_set_physics_time_step_validates() {
        let mut layout = ForceDirected2D::new(Graph::new(), seeded()).unwrap();
        assert!(layout.set_physics_time_step(-1.0).is_err());
        assert!(layout.set_physics_time_step(0.05).is_ok());
        assert_eq!(layout.config().physics_time_step, 0.05);
    }

    /// A graph that knows topology but has no data records.
    struct BareGraph;

    impl GraphView for BareGraph {
        fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
            [NodeId(0), NodeId(1)].into_iter()
        }

        fn edges(&self) -> impl Iterator<Item = EdgeEnds> + '_ {
            std::iter::once(EdgeEnds {
                id: EdgeId(0),
                source: NodeId(0),
                target: NodeId(1),
            })
        }

        fn node_data(&self, _id: NodeId) -> Option<&NodeData> {
            None
        }

        fn edge_data(&self, _id: EdgeId) -> Option<&EdgeData> {
            None
        }

        fn edges_between(&self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
            if (source, target) == (NodeId(0), NodeId(1)) {
                vec![EdgeId(0)]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_missing_data_falls_back_to_defaults() {
        let mut layout = ForceDirected2D::new(BareGraph, seeded()).unwrap();
        layout.step();

        assert_eq!(layout.point(NodeId(0)).unwrap().mass(), 1.0);
        let spring = layout.get_spring(EdgeEnds {
            id: EdgeId(0),
            source: NodeId(0),
            target: NodeId(1),
        });
        assert_eq!(spring.length, 1.0);
    }
}
