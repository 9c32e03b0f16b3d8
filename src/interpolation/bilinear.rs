//! Piecewise-linear interpolation of scattered points onto a target grid.
//!
//! The source point cloud is Delaunay-triangulated once. Every target point is
//! then located in the triangulation and its barycentric stencil (up to three
//! source nodes and their weights) is cached, so interpolating another
//! variable on the same grid pair is a weighted sum per cell.
//!
//! Points are triangulated as `(y, x)` pairs and located as `(y', x')`. The
//! order is arbitrary but has to be identical for both steps.

use ndarray::{Array2, ArrayView2};
use spade::{DelaunayTriangulation, HasPosition, Point2, PositionInTriangulation, Triangulation};
use tracing::debug;

use super::common::{ensure_same_shape, flat_index};
use super::field::MaskedField;
use crate::error::{Result, WrfInterpError};

/// A source grid point as stored in the triangulation
#[derive(Debug, Clone, Copy)]
struct SourceNode {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for SourceNode {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Source nodes and weights that reconstruct one target cell
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stencil {
    nodes: [usize; 3],
    weights: [f64; 3],
    len: usize,
}

impl Stencil {
    fn vertex(node: usize) -> Self {
        Self {
            nodes: [node, 0, 0],
            weights: [1.0, 0.0, 0.0],
            len: 1,
        }
    }

    fn edge(from: usize, to: usize, t: f64) -> Self {
        Self {
            nodes: [from, to, 0],
            weights: [1.0 - t, t, 0.0],
            len: 2,
        }
    }

    fn face(nodes: [usize; 3], weights: [f64; 3]) -> Self {
        Self {
            nodes,
            weights,
            len: 3,
        }
    }

    fn evaluate<F>(&self, sample: &F) -> Option<f64>
    where
        F: Fn(usize) -> Option<f64>,
    {
        let mut sum = 0.0;
        for k in 0..self.len {
            sum += self.weights[k] * sample(self.nodes[k])?;
        }
        Some(sum)
    }
}

/// Linear interpolator from one scattered 2-D grid to another.
///
/// Targets outside the convex hull of the source points are missing; there
/// is no extrapolation.
#[derive(Debug, Clone)]
pub struct GridInterpolator {
    source_shape: (usize, usize),
    target_shape: (usize, usize),
    stencils: Vec<Option<Stencil>>,
}

impl GridInterpolator {
    /// Triangulate the source grid and locate every target point in it.
    ///
    /// Source points with non-finite coordinates are left out of the
    /// triangulation.
    pub fn new(
        source_x: ArrayView2<f64>,
        source_y: ArrayView2<f64>,
        target_x: ArrayView2<f64>,
        target_y: ArrayView2<f64>,
    ) -> Result<Self> {
        ensure_same_shape("source x", source_x.dim(), "source y", source_y.dim())?;
        ensure_same_shape("target x", target_x.dim(), "target y", target_y.dim())?;

        let source_shape = source_x.dim();
        let target_shape = target_x.dim();

        let nodes: Vec<SourceNode> = source_x
            .indexed_iter()
            .filter_map(|((row, col), &x)| {
                let y = source_y[[row, col]];
                (x.is_finite() && y.is_finite()).then(|| SourceNode {
                    position: Point2::new(y, x),
                    index: flat_index(row, col, source_shape.1),
                })
            })
            .collect();

        let node_count = nodes.len();
        let triangulation: DelaunayTriangulation<SourceNode> =
            DelaunayTriangulation::bulk_load(nodes).map_err(|e| WrfInterpError::Triangulation {
                message: format!("{:?}", e),
            })?;

        if triangulation.num_inner_faces() == 0 {
            return Err(WrfInterpError::Triangulation {
                message: format!(
                    "{} usable source points do not span an area",
                    node_count
                ),
            });
        }

        let stencils: Vec<Option<Stencil>> = target_x
            .iter()
            .zip(target_y.iter())
            .map(|(&x, &y)| locate(&triangulation, y, x))
            .collect();

        debug!(
            source_points = node_count,
            triangles = triangulation.num_inner_faces(),
            targets = stencils.len(),
            inside_hull = stencils.iter().filter(|s| s.is_some()).count(),
            "Built interpolation stencils"
        );

        Ok(Self {
            source_shape,
            target_shape,
            stencils,
        })
    }

    /// Shape of the source grid the interpolator was built from
    pub fn source_shape(&self) -> (usize, usize) {
        self.source_shape
    }

    /// Shape of the fields this interpolator produces
    pub fn target_shape(&self) -> (usize, usize) {
        self.target_shape
    }

    /// Number of target cells inside the source hull
    pub fn covered_cells(&self) -> usize {
        self.stencils.iter().filter(|s| s.is_some()).count()
    }

    /// Interpolate a source field onto the target grid
    pub fn interpolate(&self, values: ArrayView2<f64>) -> Result<MaskedField> {
        ensure_same_shape("source grid", self.source_shape, "values", values.dim())?;
        let ncols = self.source_shape.1;
        self.apply(|i| Some(values[[i / ncols, i % ncols]]))
    }

    /// Interpolate a field that already has missing cells.
    ///
    /// A target cell is missing when any node of its stencil is missing.
    pub fn interpolate_masked(&self, values: ArrayView2<Option<f64>>) -> Result<MaskedField> {
        ensure_same_shape("source grid", self.source_shape, "values", values.dim())?;
        let ncols = self.source_shape.1;
        self.apply(|i| values[[i / ncols, i % ncols]])
    }

    fn apply<F>(&self, sample: F) -> Result<MaskedField>
    where
        F: Fn(usize) -> Option<f64>,
    {
        let cells: Vec<Option<f64>> = self
            .stencils
            .iter()
            .map(|stencil| stencil.as_ref().and_then(|s| s.evaluate(&sample)))
            .collect();

        // Stencils were collected from the target grid in logical order
        Ok(MaskedField::new(Array2::from_shape_vec(
            self.target_shape,
            cells,
        )?))
    }
}

/// Find the stencil for the plane point `(u, v)`
fn locate(triangulation: &DelaunayTriangulation<SourceNode>, u: f64, v: f64) -> Option<Stencil> {
    if !u.is_finite() || !v.is_finite() {
        return None;
    }
    let p = Point2::new(u, v);

    match triangulation.locate(p) {
        PositionInTriangulation::OnVertex(handle) => {
            Some(Stencil::vertex(triangulation.vertex(handle).data().index))
        }
        PositionInTriangulation::OnEdge(handle) => {
            let edge = triangulation.directed_edge(handle);
            let from = edge.from();
            let to = edge.to();
            let t = edge_fraction(from.position(), to.position(), p);
            Some(Stencil::edge(from.data().index, to.data().index, t))
        }
        PositionInTriangulation::OnFace(handle) => {
            let [a, b, c] = triangulation.face(handle).vertices();
            let weights = barycentric(a.position(), b.position(), c.position(), p)?;
            Some(Stencil::face(
                [a.data().index, b.data().index, c.data().index],
                weights,
            ))
        }
        PositionInTriangulation::OutsideOfConvexHull(_) | PositionInTriangulation::NoTriangulation => {
            None
        }
    }
}

/// Position of `p` along the segment `a -> b` as a fraction in [0, 1]
fn edge_fraction(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return 0.0;
    }
    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
}

/// Barycentric weights of `p` in triangle `(a, b, c)`
fn barycentric(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, p: Point2<f64>) -> Option<[f64; 3]> {
    let det = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    if det == 0.0 {
        return None;
    }
    let wb = ((p.x - a.x) * (c.y - a.y) - (c.x - a.x) * (p.y - a.y)) / det;
    let wc = ((b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)) / det;
    Some([1.0 - wb - wc, wb, wc])
}
