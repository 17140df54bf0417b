//! Spring Layout - WASM Module
//!
//! Computes node positions for a graph by simulating a spring-electrical
//! model: nodes repel like charged particles, edges pull their endpoints
//! together like springs, and everything is weakly drawn to the origin.
//! Iteration continues until the kinetic energy of the system falls below a
//! threshold or the caller stops it.
//!
//! The crate builds as a native `rlib` and as a WebAssembly module exposing a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `vector`: 2D/3D vector primitives the engine is generic over
//! - `graph`: Graph store using petgraph's StableGraph, plus the read-only
//!   `GraphView` trait the engine consumes
//! - `layout`: Points, springs, the simulation engine and its run loops
//! - `error`: Configuration and addressing errors

use js_sys::{Float32Array, Function};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod vector;

use error::{LayoutError, LayoutResult, ensure_non_negative, ensure_positive};
use graph::{EdgeData, EdgeId, Graph, NodeData, NodeId};
use layout::{ForceDirected, ForceDirected2D, ForceDirected3D, LayoutConfig, Renderer};
use vector::{Vector, Vector2, Vector3};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

impl From<LayoutError> for JsValue {
    fn from(err: LayoutError) -> Self {
        JsError::new(&err.to_string()).into()
    }
}

/// Decode an optional JS config object; `undefined`/`null` mean defaults.
fn decode_config(config: JsValue) -> LayoutResult<LayoutConfig> {
    if config.is_undefined() || config.is_null() {
        return Ok(LayoutConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|err| LayoutError::Config(err.to_string()))
}

/// Renderer forwarding notifications to JS callbacks.
struct JsRenderer {
    on_frame: Option<Function>,
    on_converged: Option<Function>,
}

impl JsRenderer {
    fn call(callback: &Option<Function>, name: &'static str) {
        let Some(callback) = callback else {
            return;
        };
        if let Err(err) = callback.call0(&JsValue::NULL) {
            tracing::error!(callback = name, error = ?err, "renderer callback failed");
            web_sys::console::error_2(&JsValue::from_str(name), &err);
        }
    }
}

impl Renderer for JsRenderer {
    fn on_frame(&mut self) {
        Self::call(&self.on_frame, "onFrame");
    }

    fn on_converged(&mut self) {
        Self::call(&self.on_converged, "onConverged");
    }
}

/// Nearest-node result handed to JS.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NearestHit {
    node: u32,
    position: Vec<f32>,
    distance: f32,
}

/// 2D force-directed layout.
///
/// Owns its graph; add nodes and edges, then either call `step()` from a
/// timer until it returns `false`, or `start()` with callbacks and drive
/// `step()` the same way.
#[wasm_bindgen]
pub struct ForceLayout2D {
    layout: ForceDirected2D,
}

#[wasm_bindgen]
impl ForceLayout2D {
    /// Create a layout. `config` is an optional object with any of
    /// `stiffness`, `repulsion`, `damping`, `threshold`, `physicsTimeStep`,
    /// `tickIntervalMs`, `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ForceLayout2D, JsValue> {
        let config = decode_config(config)?;
        Ok(Self {
            layout: ForceDirected::new(Graph::new(), config)?,
        })
    }

    // =========================================================================
    // Graph Operations
    // =========================================================================

    /// Add a node with the given mass. Returns its ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, mass: f32) -> Result<u32, JsValue> {
        Ok(add_node(self.layout.graph_mut(), mass)?)
    }

    /// Add an edge with the given rest length. Returns its ID.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32, length: f32) -> Result<u32, JsValue> {
        Ok(add_edge(self.layout.graph_mut(), source, target, length)?)
    }

    /// Remove a node and its edges.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.layout.graph_mut().remove_node(NodeId(node_id))
    }

    /// Remove an edge.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.layout.graph_mut().remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.layout.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.layout.graph().edge_count() as u32
    }

    /// Remove every node and edge and forget all simulated state.
    pub fn clear(&mut self) {
        self.layout.graph_mut().clear();
        self.layout.reset();
    }

    // =========================================================================
    // Simulation Control
    // =========================================================================

    /// Start a run. Returns `false` if one is already in progress.
    pub fn start(&mut self, on_frame: Option<Function>, on_converged: Option<Function>) -> bool {
        self.layout.start(Box::new(JsRenderer {
            on_frame,
            on_converged,
        }))
    }

    /// Run one step. Returns `true` if another step should be scheduled.
    pub fn step(&mut self) -> bool {
        !self.layout.step().is_finished()
    }

    /// Finish the run at the end of the next step.
    pub fn stop(&mut self) {
        self.layout.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.layout.is_running()
    }

    /// Suggested delay between steps, in milliseconds.
    #[wasm_bindgen(js_name = tickInterval)]
    pub fn tick_interval(&self) -> u32 {
        self.layout.config().tick_interval_ms
    }

    #[wasm_bindgen(js_name = setTickInterval)]
    pub fn set_tick_interval(&mut self, tick_interval_ms: u32) {
        self.layout.set_tick_interval(tick_interval_ms);
    }

    #[wasm_bindgen(js_name = setThreshold)]
    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), JsValue> {
        Ok(self.layout.set_threshold(threshold)?)
    }

    #[wasm_bindgen(js_name = setPhysicsTimeStep)]
    pub fn set_physics_time_step(&mut self, dt: f32) -> Result<(), JsValue> {
        Ok(self.layout.set_physics_time_step(dt)?)
    }

    #[wasm_bindgen(js_name = totalEnergy)]
    pub fn total_energy(&self) -> f32 {
        self.layout.total_energy()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Node IDs in the same order as `getPositions()`.
    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&mut self) -> Vec<u32> {
        node_positions(&mut self.layout).0
    }

    /// Positions as [x0, y0, x1, y1, ...], one pair per node.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&mut self) -> Float32Array {
        Float32Array::from(&node_positions(&mut self.layout).1[..])
    }

    /// Spring segments as [x1, y1, x2, y2, ...], one per edge.
    #[wasm_bindgen(js_name = getEdgeSegments)]
    pub fn get_edge_segments(&mut self) -> Float32Array {
        Float32Array::from(&edge_segments(&mut self.layout)[..])
    }

    /// Nearest node to (x, y) as `{ node, position, distance }`, or `null`.
    pub fn nearest(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        nearest_to_js(&mut self.layout, Vector2::new(x, y))
    }

    /// Padded bounds as [min_x, min_y, max_x, max_y].
    #[wasm_bindgen(js_name = getBoundingBox)]
    pub fn get_bounding_box(&mut self) -> Vec<f32> {
        bounding_box(&mut self.layout)
    }
}

/// 3D force-directed layout. Same API as `ForceLayout2D` with a z axis.
#[wasm_bindgen]
pub struct ForceLayout3D {
    layout: ForceDirected3D,
}

#[wasm_bindgen]
impl ForceLayout3D {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ForceLayout3D, JsValue> {
        let config = decode_config(config)?;
        Ok(Self {
            layout: ForceDirected::new(Graph::new(), config)?,
        })
    }

    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, mass: f32) -> Result<u32, JsValue> {
        Ok(add_node(self.layout.graph_mut(), mass)?)
    }

    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32, length: f32) -> Result<u32, JsValue> {
        Ok(add_edge(self.layout.graph_mut(), source, target, length)?)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.layout.graph_mut().remove_node(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.layout.graph_mut().remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.layout.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.layout.graph().edge_count() as u32
    }

    pub fn clear(&mut self) {
        self.layout.graph_mut().clear();
        self.layout.reset();
    }

    pub fn start(&mut self, on_frame: Option<Function>, on_converged: Option<Function>) -> bool {
        self.layout.start(Box::new(JsRenderer {
            on_frame,
            on_converged,
        }))
    }

    pub fn step(&mut self) -> bool {
        !self.layout.step().is_finished()
    }

    pub fn stop(&mut self) {
        self.layout.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.layout.is_running()
    }

    #[wasm_bindgen(js_name = tickInterval)]
    pub fn tick_interval(&self) -> u32 {
        self.layout.config().tick_interval_ms
    }

    #[wasm_bindgen(js_name = setTickInterval)]
    pub fn set_tick_interval(&mut self, tick_interval_ms: u32) {
        self.layout.set_tick_interval(tick_interval_ms);
    }

    #[wasm_bindgen(js_name = setThreshold)]
    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), JsValue> {
        Ok(self.layout.set_threshold(threshold)?)
    }

    #[wasm_bindgen(js_name = setPhysicsTimeStep)]
    pub fn set_physics_time_step(&mut self, dt: f32) -> Result<(), JsValue> {
        Ok(self.layout.set_physics_time_step(dt)?)
    }

    #[wasm_bindgen(js_name = totalEnergy)]
    pub fn total_energy(&self) -> f32 {
        self.layout.total_energy()
    }

    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&mut self) -> Vec<u32> {
        node_positions(&mut self.layout).0
    }

    /// Positions as [x0, y0, z0, x1, y1, z1, ...], one triple per node.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&mut self) -> Float32Array {
        Float32Array::from(&node_positions(&mut self.layout).1[..])
    }

    /// Spring segments as [x1, y1, z1, x2, y2, z2, ...], one per edge.
    #[wasm_bindgen(js_name = getEdgeSegments)]
    pub fn get_edge_segments(&mut self) -> Float32Array {
        Float32Array::from(&edge_segments(&mut self.layout)[..])
    }

    pub fn nearest(&mut self, x: f32, y: f32, z: f32) -> Result<JsValue, JsValue> {
        nearest_to_js(&mut self.layout, Vector3::new(x, y, z))
    }

    /// Padded bounds as [min_x, min_y, min_z, max_x, max_y, max_z].
    #[wasm_bindgen(js_name = getBoundingBox)]
    pub fn get_bounding_box(&mut self) -> Vec<f32> {
        bounding_box(&mut self.layout)
    }
}

// =============================================================================
// Shared helpers (no JS types, so they run natively in tests)
// =============================================================================

fn add_node(graph: &mut Graph, mass: f32) -> LayoutResult<u32> {
    ensure_positive("mass", mass)?;
    Ok(graph.add_node_with(NodeData::with_mass(mass)).raw())
}

fn add_edge(graph: &mut Graph, source: u32, target: u32, length: f32) -> LayoutResult<u32> {
    ensure_non_negative("length", length)?;
    let (source, target) = (NodeId(source), NodeId(target));
    for node in [source, target] {
        if !graph.contains_node(node) {
            return Err(LayoutError::UnknownNode(node));
        }
    }
    graph
        .add_edge_with(source, target, EdgeData::with_length(length))
        .map(EdgeId::raw)
        .ok_or(LayoutError::UnknownNode(source))
}

fn node_positions<V: Vector>(layout: &mut ForceDirected<V>) -> (Vec<u32>, Vec<f32>) {
    let mut ids = Vec::new();
    let mut positions = Vec::new();
    layout.each_node(|node, point| {
        ids.push(node.raw());
        point.position().push_components(&mut positions);
    });
    (ids, positions)
}

fn edge_segments<V: Vector>(layout: &mut ForceDirected<V>) -> Vec<f32> {
    let mut springs = Vec::new();
    layout.each_edge(|_, spring| springs.push(*spring));

    let mut segments = Vec::with_capacity(springs.len() * 2 * V::DIM);
    for spring in springs {
        for handle in [spring.point1, spring.point2] {
            if let Some(point) = layout.point_at(handle) {
                point.position().push_components(&mut segments);
            }
        }
    }
    segments
}

fn nearest_hit<V: Vector>(layout: &mut ForceDirected<V>, position: V) -> Option<NearestHit> {
    layout.nearest(position).map(|nearest| {
        let mut components = Vec::with_capacity(V::DIM);
        nearest.point.position().push_components(&mut components);
        NearestHit {
            node: nearest.node.raw(),
            position: components,
            distance: nearest.distance,
        }
    })
}

fn nearest_to_js<V: Vector>(layout: &mut ForceDirected<V>, position: V) -> Result<JsValue, JsValue> {
    match nearest_hit(layout, position) {
        Some(hit) => Ok(serde_wasm_bindgen::to_value(&hit)?),
        None => Ok(JsValue::NULL),
    }
}

fn bounding_box<V: Vector>(layout: &mut ForceDirected<V>) -> Vec<f32> {
    let bounds = layout.bounding_box();
    let mut flat = Vec::with_capacity(2 * V::DIM);
    bounds.min.push_components(&mut flat);
    bounds.max.push_components(&mut flat);
    flat
}
