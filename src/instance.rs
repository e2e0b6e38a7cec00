//! Module for parsing and representing TSP instances.
//!
//! This module handles the TSP-LIB format files: coordinate instances
//! (`EUC_2D`, `CEIL_2D`, `GEO`) and explicit distance matrices
//! (`EXPLICIT` with a row-based or full `EDGE_WEIGHT_FORMAT`).
//! Nodes are addressed internally by their index in file order; the
//! external identifiers are kept as strings for reporting.

use crate::error::{Result, TspError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Earth radius used by the TSP-LIB `GEO` distance
const GEO_EARTH_RADIUS: f64 = 6378.388;
/// Value of pi used by the TSP-LIB `GEO` conversion
const GEO_PI: f64 = 3.141592;
/// Relative tolerance when checking an explicit matrix for symmetry
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// A node position in the plane (or latitude/longitude for `GEO`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// The `EDGE_WEIGHT_TYPE` values understood by the parser
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EdgeWeightType {
    Euc2d,
    Ceil2d,
    Geo,
    Explicit,
}

impl EdgeWeightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeWeightType::Euc2d => "EUC_2D",
            EdgeWeightType::Ceil2d => "CEIL_2D",
            EdgeWeightType::Geo => "GEO",
            EdgeWeightType::Explicit => "EXPLICIT",
        }
    }
}

impl FromStr for EdgeWeightType {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUC_2D" => Ok(EdgeWeightType::Euc2d),
            "CEIL_2D" => Ok(EdgeWeightType::Ceil2d),
            "GEO" => Ok(EdgeWeightType::Geo),
            "EXPLICIT" => Ok(EdgeWeightType::Explicit),
            other => Err(TspError::UnsupportedEdgeWeightType(other.to_string())),
        }
    }
}

/// Layout of the values in an `EDGE_WEIGHT_SECTION`
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EdgeWeightFormat {
    FullMatrix,
    /// Strictly above the diagonal, row by row
    UpperRow,
    /// Strictly below the diagonal, row by row
    LowerRow,
    UpperDiagRow,
    LowerDiagRow,
}

impl EdgeWeightFormat {
    /// Number of values the section must hold for `n` nodes, `None` on overflow
    pub fn value_count(&self, n: usize) -> Option<usize> {
        match self {
            EdgeWeightFormat::FullMatrix => n.checked_mul(n),
            EdgeWeightFormat::UpperRow | EdgeWeightFormat::LowerRow => {
                n.checked_mul(n.saturating_sub(1)).map(|c| c / 2)
            }
            EdgeWeightFormat::UpperDiagRow | EdgeWeightFormat::LowerDiagRow => {
                n.checked_mul(n.checked_add(1)?).map(|c| c / 2)
            }
        }
    }

    /// Matrix cells in the order the values are listed
    fn cells(&self, n: usize, count: usize) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(count);
        for i in 0..n {
            let columns = match self {
                EdgeWeightFormat::FullMatrix => 0..n,
                EdgeWeightFormat::UpperRow => (i + 1)..n,
                EdgeWeightFormat::LowerRow => 0..i,
                EdgeWeightFormat::UpperDiagRow => i..n,
                EdgeWeightFormat::LowerDiagRow => 0..(i + 1),
            };
            cells.extend(columns.map(|j| (i, j)));
        }
        cells
    }

    /// Build the full `n x n` matrix from the listed values.
    ///
    /// The value count is checked before anything is allocated, so `n`
    /// is bounded by the data actually read.
    pub fn expand(&self, n: usize, values: &[f64]) -> Result<Vec<Vec<f64>>> {
        let expected = self
            .value_count(n)
            .ok_or_else(|| TspError::InvalidDimension(n.to_string()))?;
        if values.len() != expected {
            return Err(TspError::UnexpectedValueCount {
                expected,
                found: values.len(),
            });
        }

        let mut matrix = vec![vec![0.0; n]; n];
        for (&(i, j), &value) in self.cells(n, expected).iter().zip(values) {
            matrix[i][j] = value;
            if *self != EdgeWeightFormat::FullMatrix {
                matrix[j][i] = value;
            }
        }
        Ok(matrix)
    }
}

impl FromStr for EdgeWeightFormat {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL_MATRIX" => Ok(EdgeWeightFormat::FullMatrix),
            "UPPER_ROW" => Ok(EdgeWeightFormat::UpperRow),
            "LOWER_ROW" => Ok(EdgeWeightFormat::LowerRow),
            "UPPER_DIAG_ROW" => Ok(EdgeWeightFormat::UpperDiagRow),
            "LOWER_DIAG_ROW" => Ok(EdgeWeightFormat::LowerDiagRow),
            other => Err(TspError::UnsupportedEdgeWeightFormat(other.to_string())),
        }
    }
}

/// Which distance rule coordinate instances follow
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum DistanceMode {
    /// Unrounded Euclidean distance for every coordinate type
    #[default]
    Euclidean,
    /// TSP-LIB rules: `CEIL_2D` rounds up, `GEO` is the geographical distance
    Tsplib,
}

impl DistanceMode {
    /// Coordinate metric used for an edge weight type under this mode
    pub fn metric_for(&self, edge_weight_type: EdgeWeightType) -> CoordinateMetric {
        match (self, edge_weight_type) {
            (DistanceMode::Tsplib, EdgeWeightType::Ceil2d) => CoordinateMetric::Ceiling,
            (DistanceMode::Tsplib, EdgeWeightType::Geo) => CoordinateMetric::Geographic,
            _ => CoordinateMetric::Euclidean,
        }
    }
}

/// How distances between coordinates are measured
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CoordinateMetric {
    /// Plain Euclidean distance, unrounded
    Euclidean,
    /// Euclidean distance rounded up to the next integer
    Ceiling,
    /// TSP-LIB geographical distance in kilometres; `x` is latitude and
    /// `y` longitude, both in DDD.MM format
    Geographic,
}

impl CoordinateMetric {
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        match self {
            CoordinateMetric::Euclidean => euclidean(a, b),
            CoordinateMetric::Ceiling => euclidean(a, b).ceil(),
            CoordinateMetric::Geographic => geographic(a, b),
        }
    }
}

fn euclidean(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// DDD.MM to radians, per TSP-LIB
fn geo_radians(value: f64) -> f64 {
    let degrees = value.trunc();
    let minutes = value - degrees;
    GEO_PI * (degrees + 5.0 * minutes / 3.0) / 180.0
}

fn geographic(a: &Point, b: &Point) -> f64 {
    let (lat_a, lon_a) = (geo_radians(a.x), geo_radians(a.y));
    let (lat_b, lon_b) = (geo_radians(b.x), geo_radians(b.y));
    let q1 = (lon_a - lon_b).cos();
    let q2 = (lat_a - lat_b).cos();
    let q3 = (lat_a + lat_b).cos();
    let arc = (0.5 * ((1.0 + q1) * q2 - (1.0 - q1) * q3)).clamp(-1.0, 1.0).acos();
    (GEO_EARTH_RADIUS * arc + 1.0).trunc()
}

/// Source of pairwise distances: exactly one representation is active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Metric {
    Coordinates {
        metric: CoordinateMetric,
        points: Vec<Point>,
    },
    Explicit(Vec<Vec<f64>>),
}

impl Metric {
    fn len(&self) -> usize {
        match self {
            Metric::Coordinates { points, .. } => points.len(),
            Metric::Explicit(matrix) => matrix.len(),
        }
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        match self {
            Metric::Coordinates { metric, points } => metric.distance(&points[i], &points[j]),
            Metric::Explicit(matrix) => matrix[i][j],
        }
    }
}

/// Represents a complete, validated TSP instance
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// External node identifiers, in file order
    node_ids: Vec<String>,
    edge_weight_type: EdgeWeightType,
    metric: Metric,
}

impl Instance {
    /// Build an instance, checking every structural invariant.
    pub fn new(
        name: impl Into<String>,
        node_ids: Vec<String>,
        edge_weight_type: EdgeWeightType,
        metric: Metric,
    ) -> Result<Self> {
        let n = node_ids.len();
        if n < 2 {
            return Err(TspError::TooFewNodes(n));
        }

        let mut seen = HashSet::with_capacity(n);
        for id in &node_ids {
            if !seen.insert(id.as_str()) {
                return Err(TspError::DuplicateNode(id.clone()));
            }
        }

        if metric.len() != n {
            return Err(TspError::CoordinateCountMismatch {
                expected: n,
                found: metric.len(),
            });
        }

        match &metric {
            Metric::Explicit(matrix) => Self::validate_matrix(matrix)?,
            Metric::Coordinates { points, .. } => {
                if let Some(i) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(TspError::InvalidCoordinate(node_ids[i].clone()));
                }
            }
        }

        Ok(Instance {
            name: name.into(),
            comment: String::new(),
            node_ids,
            edge_weight_type,
            metric,
        })
    }

    /// Euclidean instance with ids `"1".."n"`
    pub fn euclidean(points: &[(f64, f64)]) -> Result<Self> {
        let points: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Self::new(
            "unnamed",
            numbered_ids(points.len()),
            EdgeWeightType::Euc2d,
            Metric::Coordinates {
                metric: CoordinateMetric::Euclidean,
                points,
            },
        )
    }

    /// Explicit-matrix instance with ids `"1".."n"`
    pub fn from_matrix(matrix: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(
            "unnamed",
            numbered_ids(matrix.len()),
            EdgeWeightType::Explicit,
            Metric::Explicit(matrix),
        )
    }

    fn validate_matrix(matrix: &[Vec<f64>]) -> Result<()> {
        let n = matrix.len();
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n {
                return Err(TspError::NonSquareMatrix {
                    rows: n,
                    row: i,
                    len: row.len(),
                });
            }
        }

        for i in 0..n {
            if matrix[i][i] != 0.0 {
                return Err(TspError::AsymmetricMatrix { from: i, to: i });
            }
            for j in 0..n {
                let value = matrix[i][j];
                if !value.is_finite() || value < 0.0 {
                    return Err(TspError::InvalidDistance { from: i, to: j, value });
                }
                let mirror = matrix[j][i];
                if (value - mirror).abs() > SYMMETRY_TOLERANCE * value.abs().max(1.0) {
                    return Err(TspError::AsymmetricMatrix { from: i, to: j });
                }
            }
        }
        Ok(())
    }

    /// Parse a TSP instance from a TSP-LIB format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with(path, DistanceMode::default())
    }

    pub fn from_file_with<P: AsRef<Path>>(path: P, mode: DistanceMode) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let mut instance = Self::parse_with(&text, mode)?;
        if instance.name.is_empty() {
            instance.name = path
                .as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(instance)
    }

    /// Parse TSP-LIB text with unrounded Euclidean coordinate distances
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, DistanceMode::default())
    }

    /// Parse TSP-LIB text, measuring coordinate instances under `mode`
    pub fn parse_with(text: &str, mode: DistanceMode) -> Result<Self> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut edge_type: Option<EdgeWeightType> = None;
        let mut edge_format: Option<String> = None;
        let mut coords: Vec<(String, Point)> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut has_weight_section = false;

        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("EOF") {
                break;
            }

            let first = line.split_whitespace().next().unwrap_or_default();
            let keyword = first.trim_end_matches(':').to_ascii_uppercase();

            if keyword.ends_with("_SECTION") {
                section = match keyword.as_str() {
                    "NODE_COORD_SECTION" => Section::Coords,
                    "EDGE_WEIGHT_SECTION" => {
                        has_weight_section = true;
                        Section::Weights
                    }
                    _ => Section::Other,
                };
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_ascii_uppercase();
                if is_header_key(&key) {
                    let value = value.trim();
                    match key.as_str() {
                        "NAME" => name = value.to_string(),
                        "COMMENT" => {
                            if !comment.is_empty() {
                                comment.push(' ');
                            }
                            comment.push_str(value);
                        }
                        "DIMENSION" => {
                            dimension = Some(
                                value
                                    .parse()
                                    .map_err(|_| TspError::InvalidDimension(value.to_string()))?,
                            );
                        }
                        "EDGE_WEIGHT_TYPE" => edge_type = Some(value.parse()?),
                        "EDGE_WEIGHT_FORMAT" => edge_format = Some(value.to_string()),
                        _ => {}
                    }
                    section = Section::None;
                    continue;
                }
            }

            match section {
                Section::Coords => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        return Err(TspError::MalformedCoordinate { line: line_no });
                    }
                    let x = parse_number(parts[1], line_no)?;
                    let y = parse_number(parts[2], line_no)?;
                    coords.push((parts[0].to_string(), Point::new(x, y)));
                }
                Section::Weights => {
                    for token in line.split_whitespace() {
                        weights.push(parse_number(token, line_no)?);
                    }
                }
                Section::None | Section::Other => {}
            }
        }

        let edge_type = match edge_type {
            Some(t) => t,
            None if !coords.is_empty() => EdgeWeightType::Euc2d,
            None if has_weight_section => EdgeWeightType::Explicit,
            None => return Err(TspError::MissingDataSection),
        };

        let mut instance = match edge_type {
            EdgeWeightType::Explicit => {
                let n = dimension.ok_or(TspError::DimensionNotFound)?;
                let format: EdgeWeightFormat = edge_format
                    .ok_or(TspError::EdgeWeightFormatNotFound)?
                    .parse()?;
                if !has_weight_section {
                    return Err(TspError::MissingDataSection);
                }
                let matrix = format.expand(n, &weights)?;
                Self::new(name, numbered_ids(n), edge_type, Metric::Explicit(matrix))?
            }
            EdgeWeightType::Euc2d | EdgeWeightType::Ceil2d | EdgeWeightType::Geo => {
                if coords.is_empty() {
                    return Err(TspError::MissingDataSection);
                }
                if let Some(n) = dimension {
                    if n != coords.len() {
                        return Err(TspError::CoordinateCountMismatch {
                            expected: n,
                            found: coords.len(),
                        });
                    }
                }
                let metric = mode.metric_for(edge_type);
                let (node_ids, points): (Vec<String>, Vec<Point>) = coords.into_iter().unzip();
                Self::new(name, node_ids, edge_type, Metric::Coordinates { metric, points })?
            }
        };

        instance.comment = comment;
        Ok(instance)
    }

    /// Number of nodes
    #[inline]
    pub fn dimension(&self) -> usize {
        self.node_ids.len()
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// External identifier of the node at `index`
    pub fn node_id(&self, index: usize) -> &str {
        &self.node_ids[index]
    }

    /// Index of an external identifier in the stable node order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_ids.iter().position(|n| n == id)
    }

    pub fn edge_weight_type(&self) -> EdgeWeightType {
        self.edge_weight_type
    }

    /// Node positions, if the instance is coordinate based
    pub fn coordinates(&self) -> Option<&[Point]> {
        match &self.metric {
            Metric::Coordinates { points, .. } => Some(points),
            Metric::Explicit(_) => None,
        }
    }

    /// Get the distance between two nodes
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.metric.distance(i, j)
    }

    /// Full `n x n` distance table
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        match &self.metric {
            Metric::Explicit(matrix) => matrix.clone(),
            Metric::Coordinates { .. } => {
                let n = self.dimension();
                let mut matrix = vec![vec![0.0; n]; n];
                for i in 0..n {
                    for j in (i + 1)..n {
                        let d = self.distance(i, j);
                        matrix[i][j] = d;
                        matrix[j][i] = d;
                    }
                }
                matrix
            }
        }
    }

    /// Calculate total length of a closed tour
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }

        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// True when `tour` visits every node exactly once
    pub fn is_permutation(&self, tour: &[usize]) -> bool {
        let n = self.dimension();
        if tour.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &node in tour {
            if node >= n || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.dimension();
        let mut total = 0.0;
        let mut min_distance = f64::INFINITY;
        let mut max_distance = 0.0f64;
        let mut pairs = 0usize;

        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(i, j);
                total += d;
                min_distance = min_distance.min(d);
                max_distance = max_distance.max(d);
                pairs += 1;
            }
        }

        InstanceStatistics {
            name: self.name.clone(),
            dimension: n,
            edge_weight_type: self.edge_weight_type.as_str().to_string(),
            avg_distance: total / pairs as f64,
            min_distance,
            max_distance,
        }
    }
}

impl FromStr for Instance {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        Instance::parse(s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Section {
    None,
    Coords,
    Weights,
    Other,
}

fn is_header_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
        && key.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TspError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn numbered_ids(n: usize) -> Vec<String> {
    (1..=n).map(|i| i.to_string()).collect()
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub edge_weight_type: String,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Nodes: {}", self.dimension)?;
        writeln!(f, "  Edge weight type: {}", self.edge_weight_type)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "NAME : square4
TYPE : TSP
DIMENSION : 4
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0 0
2 1 0
3 1 1
4 0 1
EOF
";

    const EXPLICIT3: &str = "NAME: tri3
DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: UPPER_ROW
EDGE_WEIGHT_SECTION
1 2
1
EOF
";

    #[test]
    fn test_parse_coordinates() {
        let instance = Instance::parse(SQUARE).unwrap();
        assert_eq!(instance.name, "square4");
        assert_eq!(instance.dimension(), 4);
        assert_eq!(instance.node_ids(), &["1", "2", "3", "4"]);
        assert_eq!(instance.edge_weight_type(), EdgeWeightType::Euc2d);
        assert!((instance.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
        assert!((instance.tour_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_upper_row() {
        let instance: Instance = EXPLICIT3.parse().unwrap();
        let expected = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        assert_eq!(instance.distance_matrix(), expected);
        assert!(instance.coordinates().is_none());
        assert_eq!(instance.node_id(2), "3");
    }

    #[test]
    fn test_parse_lower_diag_row() {
        let text = "DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW
EDGE_WEIGHT_SECTION
0
5 0
7 3 0
EOF";
        let instance = Instance::parse(text).unwrap();
        assert_eq!(instance.distance(0, 1), 5.0);
        assert_eq!(instance.distance(2, 0), 7.0);
        assert_eq!(instance.distance(1, 2), 3.0);
    }

    #[test]
    fn test_missing_dimension() {
        let text = EXPLICIT3.replace("DIMENSION: 3\n", "");
        let err = Instance::parse(&text).unwrap_err();
        assert!(matches!(err, TspError::DimensionNotFound));
        assert_eq!(err.to_string(), "dimension not found");
    }

    #[test]
    fn test_unexpected_value_count() {
        let text = EXPLICIT3.replace("1 2\n1\n", "1 2\n");
        match Instance::parse(&text) {
            Err(TspError::UnexpectedValueCount { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_type_and_format() {
        let text = SQUARE.replace("EUC_2D", "ATT");
        assert!(matches!(
            Instance::parse(&text),
            Err(TspError::UnsupportedEdgeWeightType(t)) if t == "ATT"
        ));

        let text = EXPLICIT3.replace("UPPER_ROW", "UPPER_COL");
        assert!(matches!(
            Instance::parse(&text),
            Err(TspError::UnsupportedEdgeWeightFormat(_))
        ));

        let text = EXPLICIT3.replace("EDGE_WEIGHT_FORMAT: UPPER_ROW\n", "");
        assert!(matches!(
            Instance::parse(&text),
            Err(TspError::EdgeWeightFormatNotFound)
        ));
    }

    #[test]
    fn test_coordinate_count_mismatch() {
        let text = SQUARE.replace("DIMENSION : 4", "DIMENSION : 5");
        assert!(matches!(
            Instance::parse(&text),
            Err(TspError::CoordinateCountMismatch { expected: 5, found: 4 })
        ));
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let text = SQUARE.replace("3 1 1", "3 1 one");
        match Instance::parse(&text) {
            Err(TspError::InvalidNumber { line, token }) => {
                assert_eq!(line, 8);
                assert_eq!(token, "one");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_node() {
        let text = SQUARE.replace("4 0 1", "3 0 1");
        assert!(matches!(Instance::parse(&text), Err(TspError::DuplicateNode(id)) if id == "3"));
    }

    #[test]
    fn test_too_few_nodes() {
        assert!(matches!(
            Instance::euclidean(&[(0.0, 0.0)]),
            Err(TspError::TooFewNodes(1))
        ));
        assert!(matches!(
            Instance::from_matrix(Vec::new()),
            Err(TspError::TooFewNodes(0))
        ));
    }

    #[test]
    fn test_matrix_validation() {
        let asymmetric = vec![vec![0.0, 1.0], vec![2.0, 0.0]];
        assert!(matches!(
            Instance::from_matrix(asymmetric),
            Err(TspError::AsymmetricMatrix { .. })
        ));

        let negative = vec![vec![0.0, -1.0], vec![-1.0, 0.0]];
        assert!(matches!(
            Instance::from_matrix(negative),
            Err(TspError::InvalidDistance { .. })
        ));

        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            Instance::from_matrix(ragged),
            Err(TspError::NonSquareMatrix { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_edge_weight_type_defaults_to_euclidean() {
        let text = SQUARE.replace("EDGE_WEIGHT_TYPE : EUC_2D\n", "");
        let instance = Instance::parse(&text).unwrap();
        assert_eq!(instance.edge_weight_type(), EdgeWeightType::Euc2d);
    }

    #[test]
    fn test_coordinate_types_default_to_euclidean() {
        for kind in ["CEIL_2D", "GEO"] {
            let instance = Instance::parse(&SQUARE.replace("EUC_2D", kind)).unwrap();
            assert!((instance.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
            assert_eq!(instance.edge_weight_type().as_str(), kind);
        }
    }

    #[test]
    fn test_ceil_distance() {
        let text = SQUARE.replace("EUC_2D", "CEIL_2D");
        let instance = Instance::parse_with(&text, DistanceMode::Tsplib).unwrap();
        assert_eq!(instance.distance(0, 2), 2.0);
        assert_eq!(instance.distance(0, 1), 1.0);

        // EUC_2D is unrounded under both modes
        let instance = Instance::parse_with(SQUARE, DistanceMode::Tsplib).unwrap();
        assert!((instance.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_geo_distance() {
        let a = Point::new(16.47, 96.10);
        let b = Point::new(16.47, 94.44);
        let d = CoordinateMetric::Geographic.distance(&a, &b);
        assert_eq!(d, d.trunc());
        assert!(d > 150.0 && d < 200.0);
        assert_eq!(d, CoordinateMetric::Geographic.distance(&b, &a));
    }

    #[test]
    fn test_huge_dimension_is_an_error() {
        let text = "DIMENSION: 10000000000
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: UPPER_ROW
EDGE_WEIGHT_SECTION
1 2 3
EOF";
        assert!(matches!(Instance::parse(text), Err(TspError::InvalidDimension(_))));

        let text = text.replace("UPPER_ROW", "FULL_MATRIX");
        assert!(matches!(Instance::parse(&text), Err(TspError::InvalidDimension(_))));

        // fits in a usize but not in the values read
        let text = text.replace("10000000000", "100000");
        assert!(matches!(
            Instance::parse(&text),
            Err(TspError::UnexpectedValueCount { expected: 10_000_000_000, found: 3 })
        ));

        assert_eq!(EdgeWeightFormat::LowerDiagRow.value_count(usize::MAX), None);
        assert_eq!(EdgeWeightFormat::UpperRow.value_count(4), Some(6));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        for token in ["NaN", "inf", "-infinity"] {
            let text = SQUARE.replace("3 1 1", &format!("3 {} 1", token));
            match Instance::parse(&text) {
                Err(TspError::InvalidNumber { line, token: t }) => {
                    assert_eq!(line, 8);
                    assert_eq!(t, token);
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        let text = EXPLICIT3.replace("1 2\n", "1 inf\n");
        assert!(matches!(Instance::parse(&text), Err(TspError::InvalidNumber { line: 6, .. })));

        assert!(matches!(
            Instance::euclidean(&[(0.0, 0.0), (f64::NAN, 1.0)]),
            Err(TspError::InvalidCoordinate(id)) if id == "2"
        ));
    }

    #[test]
    fn test_is_permutation() {
        let instance = Instance::parse(SQUARE).unwrap();
        assert!(instance.is_permutation(&[2, 0, 3, 1]));
        assert!(!instance.is_permutation(&[0, 0, 1, 2]));
        assert!(!instance.is_permutation(&[0, 1, 2]));
        assert!(!instance.is_permutation(&[0, 1, 2, 4]));
    }

    #[test]
    fn test_statistics() {
        let instance = Instance::parse(SQUARE).unwrap();
        let stats = instance.statistics();
        assert_eq!(stats.dimension, 4);
        assert_eq!(stats.min_distance, 1.0);
        assert!((stats.max_distance - 2f64.sqrt()).abs() < 1e-12);
        assert!(stats.to_string().contains("square4"));
    }
}
