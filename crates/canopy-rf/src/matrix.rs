/// Column-major, read-only view of the training features.
///
/// `column(f)[s]` is the value of feature `f` for sample `s`. Built once from
/// row-major input and borrowed by every tree task.
#[derive(Debug, Clone)]
pub(crate) struct SampleMatrix {
    columns: Vec<Vec<f64>>,
    n_samples: usize,
}

impl SampleMatrix {
    /// Transpose validated row-major rows. All rows must share one length.
    pub(crate) fn from_rows(rows: &[Vec<f64>], n_features: usize) -> Self {
        let columns = (0..n_features)
            .map(|feat_idx| rows.iter().map(|row| row[feat_idx]).collect())
            .collect();
        Self {
            columns,
            n_samples: rows.len(),
        }
    }

    pub(crate) fn column(&self, feature: usize) -> &[f64] {
        &self.columns[feature]
    }

    pub(crate) fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn n_samples(&self) -> usize {
        self.n_samples
    }
}
