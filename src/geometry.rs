//! Geometry primitives shared by the content interpreter, word grouping and
//! the table finder.
//!
//! All page-level coordinates use a top-left origin: `x` grows to the right,
//! `top`/`bottom` grow downward, in PDF points.

/// A 2D affine transformation `[a, b, c, d, e, f]`:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
pub type Matrix = [f64; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Multiply two matrices (`m1` applied first, then `m2`).
pub fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Transform a point by a matrix.
pub fn apply(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

/// Axis-aligned bounding box in top-left page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Overlapping region, if the boxes overlap with positive area.
    pub fn overlap(&self, other: &BBox) -> Option<BBox> {
        let x0 = self.x0.max(other.x0);
        let x1 = self.x1.min(other.x1);
        let top = self.top.max(other.top);
        let bottom = self.bottom.min(other.bottom);
        if x1 - x0 > 0.0 && bottom - top > 0.0 {
            Some(BBox::new(x0, top, x1, bottom))
        } else {
            None
        }
    }

    /// Half-open containment test used for assigning chars to cells.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.top && y < self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A stroked or filled two-point path
    Line,
    /// One side of a rectangle
    RectEdge,
    /// An axis-aligned segment of a longer path
    CurveEdge,
    /// Synthesized from word alignment
    WordEdge,
}

/// An axis-aligned ruling segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub orientation: Orientation,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn horizontal(x0: f64, x1: f64, top: f64, kind: EdgeKind) -> Self {
        Self {
            x0: x0.min(x1),
            x1: x0.max(x1),
            top,
            bottom: top,
            orientation: Orientation::Horizontal,
            kind,
        }
    }

    pub fn vertical(x: f64, top: f64, bottom: f64, kind: EdgeKind) -> Self {
        Self {
            x0: x,
            x1: x,
            top: top.min(bottom),
            bottom: top.max(bottom),
            orientation: Orientation::Vertical,
            kind,
        }
    }

    /// Build an edge between two points, or `None` for a diagonal segment.
    pub fn between(p0: (f64, f64), p1: (f64, f64), kind: EdgeKind) -> Option<Self> {
        const EPS: f64 = 1e-6;
        if (p0.1 - p1.1).abs() < EPS {
            Some(Edge::horizontal(p0.0, p1.0, p0.1, kind))
        } else if (p0.0 - p1.0).abs() < EPS {
            Some(Edge::vertical(p0.0, p0.1, p1.1, kind))
        } else {
            None
        }
    }

    /// The four sides of a box.
    pub fn from_rect(rect: BBox) -> [Edge; 4] {
        [
            Edge::horizontal(rect.x0, rect.x1, rect.top, EdgeKind::RectEdge),
            Edge::horizontal(rect.x0, rect.x1, rect.bottom, EdgeKind::RectEdge),
            Edge::vertical(rect.x0, rect.top, rect.bottom, EdgeKind::RectEdge),
            Edge::vertical(rect.x1, rect.top, rect.bottom, EdgeKind::RectEdge),
        ]
    }

    /// Extent along the edge's own direction.
    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }
}

/// Group sorted values into runs where each value is within `tolerance` of
/// the previous one. Returns the groups in ascending order.
pub fn cluster_list(values: &[f64], tolerance: f64) -> Vec<Vec<f64>> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    if tolerance == 0.0 || sorted.len() < 2 {
        return sorted.into_iter().map(|v| vec![v]).collect();
    }

    let mut groups = Vec::new();
    let mut current = vec![sorted[0]];
    let mut last = sorted[0];
    for &v in &sorted[1..] {
        if v <= last + tolerance {
            current.push(v);
        } else {
            groups.push(std::mem::take(&mut current));
            current.push(v);
        }
        last = v;
    }
    groups.push(current);
    groups
}

/// Cluster objects by a numeric key. Clusters come out in ascending key
/// order; objects inside a cluster keep their input order.
pub fn cluster_objects<T: Clone, F>(objects: &[T], key: F, tolerance: f64) -> Vec<Vec<T>>
where
    F: Fn(&T) -> f64,
{
    let values: Vec<f64> = objects.iter().map(&key).collect();
    let clusters = cluster_list(&values, tolerance);

    // Map each value to the cluster holding it; bounds are contiguous so a
    // lookup by range is enough.
    let bounds: Vec<(f64, f64)> = clusters
        .iter()
        .map(|c| (c[0], c[c.len() - 1]))
        .collect();

    let mut grouped: Vec<Vec<T>> = vec![Vec::new(); clusters.len()];
    for (obj, value) in objects.iter().zip(values) {
        if let Some(idx) = bounds
            .iter()
            .position(|&(lo, hi)| value >= lo && value <= hi)
        {
            grouped[idx].push(obj.clone());
        }
    }
    grouped.retain(|g| !g.is_empty());
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_translation_then_scale() {
        let translate = [1.0, 0.0, 0.0, 1.0, 10.0, 20.0];
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let m = multiply(&translate, &scale);
        assert_eq!(apply(&m, 1.0, 1.0), (22.0, 42.0));
    }

    #[test]
    fn test_cluster_list_chains_within_tolerance() {
        let groups = cluster_list(&[10.0, 1.0, 2.5, 4.0, 20.0], 2.0);
        assert_eq!(groups, vec![vec![1.0, 2.5, 4.0], vec![10.0], vec![20.0]]);
    }

    #[test]
    fn test_cluster_list_zero_tolerance() {
        let groups = cluster_list(&[3.0, 1.0, 1.0], 0.0);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![1.0]);
    }

    #[test]
    fn test_cluster_objects_keeps_input_order() {
        let objs = vec![("b", 5.0), ("a", 4.0), ("c", 50.0)];
        let clusters = cluster_objects(&objs, |o| o.1, 3.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0][0].0, "b");
        assert_eq!(clusters[0][1].0, "a");
        assert_eq!(clusters[1][0].0, "c");
    }

    #[test]
    fn test_edge_between_rejects_diagonal() {
        assert!(Edge::between((0.0, 0.0), (5.0, 5.0), EdgeKind::Line).is_none());
        let e = Edge::between((5.0, 2.0), (1.0, 2.0), EdgeKind::Line).unwrap();
        assert_eq!(e.orientation, Orientation::Horizontal);
        assert_eq!((e.x0, e.x1), (1.0, 5.0));
    }

    #[test]
    fn test_bbox_contains_is_half_open() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains_point(0.0, 0.0));
        assert!(!b.contains_point(10.0, 5.0));
    }
}
