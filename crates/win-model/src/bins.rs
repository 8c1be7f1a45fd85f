//! Half-open interval partitions for evaluations and move numbers.

use crate::error::ModelError;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Ordered evaluation-bin edges in pawns.
///
/// K edges partition the axis into K+1 right-closed cells including the
/// underflow cell `(-inf, e0]` and the overflow cell `(e_{K-1}, inf)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalBins {
    edges: Vec<f64>,
}

impl EvalBins {
    pub fn new(edges: Vec<f64>) -> Result<Self, ModelError> {
        let edges: Vec<f64> = edges.into_iter().map(round2).collect();
        if edges.is_empty() {
            return Err(ModelError::Bins("no evaluation-bin edges".into()));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::Bins(
                "evaluation-bin edges must be strictly increasing".into(),
            ));
        }
        Ok(Self { edges })
    }

    /// Edges from `lo` (inclusive) to `hi` (exclusive) in `step` increments.
    pub fn from_range(lo: f64, hi: f64, step: f64) -> Result<Self, ModelError> {
        if step <= 0.0 || !step.is_finite() {
            return Err(ModelError::Bins(format!("bad bin step {step}")));
        }
        let mut edges = Vec::new();
        let mut i = 0u32;
        loop {
            let edge = round2(lo + f64::from(i) * step);
            if edge >= hi - 1e-9 {
                break;
            }
            edges.push(edge);
            i += 1;
        }
        Self::new(edges)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn cell_count(&self) -> usize {
        self.edges.len() + 1
    }

    /// Right-closed digitization: cell i holds `edges[i-1] < x <= edges[i]`.
    pub fn index(&self, x: f64) -> usize {
        self.edges.partition_point(|e| *e < x)
    }

    /// Interval label per cell.
    pub fn labels(&self) -> Vec<String> {
        let k = self.edges.len();
        let mut labels = Vec::with_capacity(k + 1);
        labels.push(format!("(-inf, {}]", self.edges[0]));
        for w in self.edges.windows(2) {
            labels.push(format!("({}, {}]", w[0], w[1]));
        }
        labels.push(format!("({}, inf)", self.edges[k - 1]));
        labels
    }

    /// Recover edges from persisted interval labels (the upper bound of each
    /// cell except the overflow one).
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, ModelError> {
        if labels.len() < 2 {
            return Err(ModelError::Bins("need at least two interval labels".into()));
        }
        let mut edges = Vec::with_capacity(labels.len() - 1);
        for label in &labels[..labels.len() - 1] {
            let label = label.as_ref();
            let upper = label
                .trim_end_matches(']')
                .rsplit(',')
                .next()
                .map(str::trim)
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| ModelError::Bins(format!("bad interval label {label:?}")))?;
            edges.push(upper);
        }
        Self::new(edges)
    }

    /// Representative x-coordinate per cell for interpolation. The first
    /// edge does double duty for the underflow cell.
    pub(crate) fn cell_positions(&self) -> Vec<f64> {
        let mut xs = Vec::with_capacity(self.cell_count());
        xs.push(self.edges[0]);
        xs.extend_from_slice(&self.edges);
        xs
    }
}

/// Move-number partition: one bucket for every move, or ordered lower edges
/// with the last bin unbounded.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveBins {
    All,
    Edges(Vec<u32>),
}

impl MoveBins {
    /// Evenly strided edges `0, size, 2*size, …` below `limit`.
    pub fn stride(size: u32, limit: u32) -> Result<Self, ModelError> {
        if size == 0 {
            return Err(ModelError::Bins("move-bin stride must be positive".into()));
        }
        Ok(MoveBins::Edges((0..limit).step_by(size as usize).collect()))
    }

    pub fn cell_count(&self) -> usize {
        match self {
            MoveBins::All => 1,
            MoveBins::Edges(edges) => edges.len(),
        }
    }

    /// Bin of a 0-based ply index: the bin whose lower edge is the largest
    /// edge not exceeding it.
    pub fn index(&self, ply_index: usize) -> usize {
        match self {
            MoveBins::All => 0,
            MoveBins::Edges(edges) => edges
                .partition_point(|e| *e as usize <= ply_index)
                .saturating_sub(1),
        }
    }

    /// Persisted file name per move bin.
    pub fn file_names(&self) -> Vec<String> {
        match self {
            MoveBins::All => vec!["winning_chances_all.csv".to_string()],
            MoveBins::Edges(edges) => {
                let mut names = Vec::with_capacity(edges.len());
                for (i, lo) in edges.iter().enumerate() {
                    match edges.get(i + 1) {
                        Some(hi) => names.push(format!("winning_chances_{lo}-{hi}.csv")),
                        None => names.push(format!("winning_chances_{lo}-.csv")),
                    }
                }
                names
            }
        }
    }
}
