//! Table detection from ruling lines and word alignment
//!
//! Edges are snapped and joined, their intersections become grid points,
//! the smallest rectangles spanning connected points become cells, and cells
//! sharing corners become tables.

use crate::geometry::{cluster_objects, BBox, Edge, EdgeKind, Orientation};
use crate::interpreter::{Char, PageContent};
use crate::words::{extract_text, extract_words, Word, WordOptions};
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// Extracted table content: rows of cells, `None` where the grid has no cell.
pub type TableData = Vec<Vec<Option<String>>>;

type KeyPoint = (OrderedFloat<f64>, OrderedFloat<f64>);

fn key_point(x: f64, y: f64) -> KeyPoint {
    (OrderedFloat(x), OrderedFloat(y))
}

/// How table boundaries are found along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Every drawn edge: lines, rectangle sides and curve segments
    Lines,
    /// Only explicit line segments
    #[value(name = "lines_strict")]
    LinesStrict,
    /// Edges implied by word alignment
    Text,
}

/// Table finder configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSettings {
    pub vertical_strategy: Strategy,
    pub horizontal_strategy: Strategy,
    pub snap_x_tolerance: f64,
    pub snap_y_tolerance: f64,
    pub join_x_tolerance: f64,
    pub join_y_tolerance: f64,
    /// Edges shorter than this are dropped after merging
    pub edge_min_length: f64,
    /// Edges shorter than this are dropped before merging
    pub edge_min_length_prefilter: f64,
    /// Words needed to imply a vertical edge
    pub min_words_vertical: usize,
    /// Words needed to imply a horizontal edge
    pub min_words_horizontal: usize,
    pub intersection_x_tolerance: f64,
    pub intersection_y_tolerance: f64,
    /// Word grouping used for cell text and the text strategy
    pub text: WordOptions,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            vertical_strategy: Strategy::Lines,
            horizontal_strategy: Strategy::Lines,
            snap_x_tolerance: 3.0,
            snap_y_tolerance: 3.0,
            join_x_tolerance: 3.0,
            join_y_tolerance: 3.0,
            edge_min_length: 3.0,
            edge_min_length_prefilter: 1.0,
            min_words_vertical: 3,
            min_words_horizontal: 1,
            intersection_x_tolerance: 3.0,
            intersection_y_tolerance: 3.0,
            text: WordOptions::default(),
        }
    }
}

impl TableSettings {
    /// Line-based detection on both axes, stated explicitly.
    pub fn lines() -> Self {
        Self::with_strategies(Strategy::Lines, Strategy::Lines)
    }

    pub fn with_strategies(vertical: Strategy, horizontal: Strategy) -> Self {
        Self {
            vertical_strategy: vertical,
            horizontal_strategy: horizontal,
            ..Self::default()
        }
    }
}

/// A detected table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub cells: Vec<BBox>,
}

impl Table {
    pub fn bbox(&self) -> BBox {
        let mut cells = self.cells.iter();
        let first = cells.next().copied().unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        cells.fold(first, |acc, c| acc.union(c))
    }

    /// Cells grouped into rows by `top`, laid out on the table's column grid.
    pub fn rows(&self) -> Vec<Vec<Option<BBox>>> {
        let mut sorted = self.cells.clone();
        sorted.sort_by(|a, b| (a.top, a.x0).partial_cmp(&(b.top, b.x0)).unwrap_or(std::cmp::Ordering::Equal));

        let xs: Vec<OrderedFloat<f64>> = sorted
            .iter()
            .map(|c| OrderedFloat(c.x0))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rows = Vec::new();
        let mut start = 0;
        while start < sorted.len() {
            let top = sorted[start].top;
            let end = sorted[start..]
                .iter()
                .position(|c| c.top != top)
                .map(|n| start + n)
                .unwrap_or(sorted.len());
            let by_x: HashMap<OrderedFloat<f64>, BBox> = sorted[start..end]
                .iter()
                .map(|c| (OrderedFloat(c.x0), *c))
                .collect();
            rows.push(xs.iter().map(|x| by_x.get(x).copied()).collect());
            start = end;
        }
        rows
    }

    /// Text of every cell. Chars are assigned to a cell by their centre.
    pub fn extract(&self, chars: &[Char], opts: &WordOptions) -> TableData {
        let rows = self.rows();
        let mut data = Vec::with_capacity(rows.len());

        for row in rows {
            let row_bbox = row
                .iter()
                .flatten()
                .fold(None::<BBox>, |acc, c| Some(acc.map_or(*c, |a| a.union(c))));
            let row_chars: Vec<&Char> = match row_bbox {
                Some(b) => chars.iter().filter(|c| char_in_bbox(c, &b)).collect(),
                None => Vec::new(),
            };

            let cells = row
                .iter()
                .map(|cell| {
                    cell.map(|bbox| {
                        let inside: Vec<Char> = row_chars
                            .iter()
                            .filter(|c| char_in_bbox(c, &bbox))
                            .map(|c| (*c).clone())
                            .collect();
                        if inside.is_empty() {
                            String::new()
                        } else {
                            extract_text(&inside, opts)
                        }
                    })
                })
                .collect();
            data.push(cells);
        }
        data
    }
}

fn char_in_bbox(c: &Char, bbox: &BBox) -> bool {
    bbox.contains_point((c.x0 + c.x1) / 2.0, (c.top + c.bottom) / 2.0)
}

/// Find tables on an interpreted page.
pub fn find_tables(page: &PageContent, settings: &TableSettings) -> Vec<Table> {
    let edges = table_edges(page, settings);
    let intersections = edges_to_intersections(
        &edges,
        settings.intersection_x_tolerance,
        settings.intersection_y_tolerance,
    );
    let cells = intersections_to_cells(&intersections);
    let tables: Vec<Table> = cells_to_tables(cells)
        .into_iter()
        .map(|cells| Table { cells })
        .collect();

    log::debug!(
        "{} edges, {} intersections, {} tables ({:?}/{:?})",
        edges.len(),
        intersections.len(),
        tables.len(),
        settings.vertical_strategy,
        settings.horizontal_strategy
    );
    tables
}

/// Find tables and extract their text.
pub fn extract_tables(page: &PageContent, settings: &TableSettings) -> Vec<TableData> {
    find_tables(page, settings)
        .iter()
        .map(|t| t.extract(&page.chars, &settings.text))
        .collect()
}

fn strategy_edges(
    page: &PageContent,
    words: &[Word],
    strategy: Strategy,
    orientation: Orientation,
    settings: &TableSettings,
) -> Vec<Edge> {
    match strategy {
        Strategy::Text => match orientation {
            Orientation::Vertical => words_to_edges_v(words, settings.min_words_vertical),
            Orientation::Horizontal => words_to_edges_h(words, settings.min_words_horizontal),
        },
        Strategy::Lines | Strategy::LinesStrict => page
            .edges
            .iter()
            .filter(|e| e.orientation == orientation)
            .filter(|e| strategy == Strategy::Lines || e.kind == EdgeKind::Line)
            .filter(|e| e.length() >= settings.edge_min_length_prefilter)
            .copied()
            .collect(),
    }
}

fn table_edges(page: &PageContent, settings: &TableSettings) -> Vec<Edge> {
    let uses_text = settings.vertical_strategy == Strategy::Text
        || settings.horizontal_strategy == Strategy::Text;
    let words = if uses_text {
        extract_words(&page.chars, &settings.text)
    } else {
        Vec::new()
    };

    let mut edges = strategy_edges(
        page,
        &words,
        settings.vertical_strategy,
        Orientation::Vertical,
        settings,
    );
    edges.extend(strategy_edges(
        page,
        &words,
        settings.horizontal_strategy,
        Orientation::Horizontal,
        settings,
    ));

    merge_edges(
        edges,
        settings.snap_x_tolerance,
        settings.snap_y_tolerance,
        settings.join_x_tolerance,
        settings.join_y_tolerance,
    )
    .into_iter()
    .filter(|e| e.length() >= settings.edge_min_length)
    .collect()
}

/// Move edges of each orientation onto the mean position of their cluster.
fn snap_edges(edges: Vec<Edge>, x_tolerance: f64, y_tolerance: f64) -> Vec<Edge> {
    let (mut v_edges, mut h_edges): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Vertical);

    if x_tolerance > 0.0 {
        v_edges = cluster_objects(&v_edges, |e| e.x0, x_tolerance)
            .into_iter()
            .flat_map(|cluster| {
                let avg = cluster.iter().map(|e| e.x0).sum::<f64>() / cluster.len() as f64;
                cluster.into_iter().map(move |e| Edge {
                    x0: avg,
                    x1: avg,
                    ..e
                })
            })
            .collect();
    }

    if y_tolerance > 0.0 {
        h_edges = cluster_objects(&h_edges, |e| e.top, y_tolerance)
            .into_iter()
            .flat_map(|cluster| {
                let avg = cluster.iter().map(|e| e.top).sum::<f64>() / cluster.len() as f64;
                cluster.into_iter().map(move |e| Edge {
                    top: avg,
                    bottom: avg,
                    ..e
                })
            })
            .collect();
    }

    v_edges.into_iter().chain(h_edges).collect()
}

/// Join collinear edges whose gap is within `tolerance`.
fn join_edge_group(mut edges: Vec<Edge>, orientation: Orientation, tolerance: f64) -> Vec<Edge> {
    let span = |e: &Edge| match orientation {
        Orientation::Horizontal => (e.x0, e.x1),
        Orientation::Vertical => (e.top, e.bottom),
    };
    edges.sort_by(|a, b| span(a).0.total_cmp(&span(b).0));

    let mut joined: Vec<Edge> = Vec::with_capacity(edges.len());
    for e in edges {
        let (e_min, e_max) = span(&e);
        if let Some(last) = joined.last_mut() {
            let last_max = span(&*last).1;
            if e_min <= last_max + tolerance {
                if e_max > last_max {
                    match orientation {
                        Orientation::Horizontal => last.x1 = e.x1,
                        Orientation::Vertical => last.bottom = e.bottom,
                    }
                }
                continue;
            }
        }
        joined.push(e);
    }
    joined
}

fn merge_edges(
    edges: Vec<Edge>,
    snap_x_tolerance: f64,
    snap_y_tolerance: f64,
    join_x_tolerance: f64,
    join_y_tolerance: f64,
) -> Vec<Edge> {
    let edges = if snap_x_tolerance > 0.0 || snap_y_tolerance > 0.0 {
        snap_edges(edges, snap_x_tolerance, snap_y_tolerance)
    } else {
        edges
    };

    let mut grouped: BTreeMap<(Orientation, OrderedFloat<f64>), Vec<Edge>> = BTreeMap::new();
    for e in edges {
        let pos = match e.orientation {
            Orientation::Horizontal => e.top,
            Orientation::Vertical => e.x0,
        };
        grouped.entry((e.orientation, OrderedFloat(pos))).or_default().push(e);
    }

    grouped
        .into_iter()
        .flat_map(|((orientation, _), group)| {
            let tol = match orientation {
                Orientation::Horizontal => join_x_tolerance,
                Orientation::Vertical => join_y_tolerance,
            };
            join_edge_group(group, orientation, tol)
        })
        .collect()
}

fn words_bbox(words: &[Word]) -> BBox {
    words
        .iter()
        .map(|w| BBox::new(w.x0, w.top, w.x1, w.bottom))
        .reduce(|a, b| a.union(&b))
        .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0))
}

/// Horizontal edges along the top and bottom of each row of words.
fn words_to_edges_h(words: &[Word], word_threshold: usize) -> Vec<Edge> {
    let rects: Vec<BBox> = cluster_objects(words, |w| w.top, 1.0)
        .iter()
        .filter(|c| c.len() >= word_threshold)
        .map(|c| words_bbox(c))
        .collect();
    if rects.is_empty() {
        return Vec::new();
    }

    let min_x0 = rects.iter().map(|r| r.x0).fold(f64::INFINITY, f64::min);
    let max_x1 = rects.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max);

    rects
        .iter()
        .flat_map(|r| {
            [
                Edge::horizontal(min_x0, max_x1, r.top, EdgeKind::WordEdge),
                Edge::horizontal(min_x0, max_x1, r.bottom, EdgeKind::WordEdge),
            ]
        })
        .collect()
}

/// Vertical edges at the left of each column of aligned words, plus one at
/// the right edge of the rightmost column.
fn words_to_edges_v(words: &[Word], word_threshold: usize) -> Vec<Edge> {
    let mut clusters = cluster_objects(words, |w| w.x0, 1.0);
    clusters.extend(cluster_objects(words, |w| w.x1, 1.0));
    clusters.extend(cluster_objects(words, |w| (w.x0 + w.x1) / 2.0, 1.0));
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut condensed: Vec<BBox> = Vec::new();
    for bbox in clusters
        .iter()
        .filter(|c| c.len() >= word_threshold)
        .map(|c| words_bbox(c))
    {
        if !condensed.iter().any(|c| c.overlap(&bbox).is_some()) {
            condensed.push(bbox);
        }
    }
    if condensed.is_empty() {
        return Vec::new();
    }

    condensed.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    let max_x1 = condensed.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max);
    let min_top = condensed.iter().map(|r| r.top).fold(f64::INFINITY, f64::min);
    let max_bottom = condensed.iter().map(|r| r.bottom).fold(f64::NEG_INFINITY, f64::max);

    condensed
        .iter()
        .map(|r| r.x0)
        .chain(std::iter::once(max_x1))
        .map(|x| Edge::vertical(x, min_top, max_bottom, EdgeKind::WordEdge))
        .collect()
}

/// Edges meeting at a grid point, as indices into the merged edge list.
#[derive(Debug, Default, Clone)]
struct Intersection {
    v: BTreeSet<usize>,
    h: BTreeSet<usize>,
}

fn edges_to_intersections(
    edges: &[Edge],
    x_tolerance: f64,
    y_tolerance: f64,
) -> BTreeMap<KeyPoint, Intersection> {
    let mut v: Vec<(usize, &Edge)> = edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.orientation == Orientation::Vertical)
        .collect();
    let mut h: Vec<(usize, &Edge)> = edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.orientation == Orientation::Horizontal)
        .collect();
    v.sort_by(|a, b| (a.1.x0, a.1.top).partial_cmp(&(b.1.x0, b.1.top)).unwrap_or(std::cmp::Ordering::Equal));
    h.sort_by(|a, b| (a.1.top, a.1.x0).partial_cmp(&(b.1.top, b.1.x0)).unwrap_or(std::cmp::Ordering::Equal));

    let mut intersections: BTreeMap<KeyPoint, Intersection> = BTreeMap::new();
    for &(vi, ve) in &v {
        for &(hi, he) in &h {
            if ve.top <= he.top + y_tolerance
                && ve.bottom >= he.top - y_tolerance
                && ve.x0 >= he.x0 - x_tolerance
                && ve.x0 <= he.x1 + x_tolerance
            {
                let entry = intersections.entry(key_point(ve.x0, he.top)).or_default();
                entry.v.insert(vi);
                entry.h.insert(hi);
            }
        }
    }
    intersections
}

/// Smallest cell whose top-left corner is each intersection point.
fn intersections_to_cells(intersections: &BTreeMap<KeyPoint, Intersection>) -> Vec<BBox> {
    let points: Vec<KeyPoint> = intersections.keys().copied().collect();

    let edge_connects = |p1: &KeyPoint, p2: &KeyPoint| -> bool {
        let (Some(a), Some(b)) = (intersections.get(p1), intersections.get(p2)) else {
            return false;
        };
        (p1.0 == p2.0 && !a.v.is_disjoint(&b.v)) || (p1.1 == p2.1 && !a.h.is_disjoint(&b.h))
    };

    let mut cells = Vec::new();
    for (i, pt) in points.iter().enumerate() {
        let rest = &points[i + 1..];
        // Points are sorted by (x, y), so these come out nearest first
        let below: Vec<&KeyPoint> = rest.iter().filter(|p| p.0 == pt.0).collect();
        let right: Vec<&KeyPoint> = rest.iter().filter(|p| p.1 == pt.1).collect();

        'below: for below_pt in below {
            if !edge_connects(pt, below_pt) {
                continue;
            }
            for right_pt in &right {
                if !edge_connects(pt, right_pt) {
                    continue;
                }
                let bottom_right = (right_pt.0, below_pt.1);
                if intersections.contains_key(&bottom_right)
                    && edge_connects(&bottom_right, right_pt)
                    && edge_connects(&bottom_right, below_pt)
                {
                    cells.push(BBox::new(
                        pt.0.into_inner(),
                        pt.1.into_inner(),
                        bottom_right.0.into_inner(),
                        bottom_right.1.into_inner(),
                    ));
                    break 'below;
                }
            }
        }
    }
    cells
}

/// Group cells sharing a corner into tables; single cells are dropped.
fn cells_to_tables(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let corners = |b: &BBox| {
        [
            key_point(b.x0, b.top),
            key_point(b.x0, b.bottom),
            key_point(b.x1, b.top),
            key_point(b.x1, b.bottom),
        ]
    };

    let mut by_corner: HashMap<KeyPoint, Vec<usize>> = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        for corner in corners(cell) {
            by_corner.entry(corner).or_default().push(idx);
        }
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut tables: Vec<Vec<BBox>> = Vec::new();
    for start in 0..cells.len() {
        if !visited.insert(start) {
            continue;
        }
        let mut queue = VecDeque::from([start]);
        let mut group = Vec::new();
        while let Some(idx) = queue.pop_front() {
            group.push(idx);
            for corner in corners(&cells[idx]) {
                for &n in by_corner.get(&corner).into_iter().flatten() {
                    if visited.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
        }
        group.sort_unstable();
        tables.push(group.into_iter().map(|i| cells[i]).collect());
    }

    let origin = |t: &Vec<BBox>| {
        t.iter()
            .map(|c| (OrderedFloat(c.top), OrderedFloat(c.x0)))
            .min()
            .unwrap_or((OrderedFloat(0.0), OrderedFloat(0.0)))
    };
    tables.sort_by_key(origin);
    tables.retain(|t| t.len() > 1);
    tables
}
