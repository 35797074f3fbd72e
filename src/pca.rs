use nalgebra::DMatrix;

use crate::error::PipelineError;

/// First two principal-component scores per sample.
#[derive(Debug, Clone)]
pub struct PcaScores {
    pub samples: Vec<String>,
    pub scores: Vec<[f64; 2]>,
}

/// Rank-2 PCA of log1p-transformed abundances. Rows of `tpm_rows` are
/// samples (in `samples` order), columns are transcripts. Each
/// transcript is mean-centered across samples before the SVD; scores
/// are `u[:, :2] * s[:2]`.
pub fn pca_scores(samples: &[String], tpm_rows: &[Vec<f64>]) -> Result<PcaScores, PipelineError> {
    let n_samples = samples.len();
    if n_samples < 2 {
        return Err(PipelineError::TooFewSamples(n_samples));
    }
    debug_assert_eq!(n_samples, tpm_rows.len());
    let n_transcripts = tpm_rows.first().map(Vec::len).unwrap_or(0);

    let mut matrix = DMatrix::from_fn(n_samples, n_transcripts, |row, col| {
        tpm_rows[row][col].ln_1p()
    });
    for col in 0..n_transcripts {
        let mean = matrix.column(col).sum() / n_samples as f64;
        for row in 0..n_samples {
            matrix[(row, col)] -= mean;
        }
    }

    let svd = matrix.svd(true, false);
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| PipelineError::Plot("SVD did not produce U".to_string()))?;

    // singular values are not guaranteed to come out ordered
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| {
        svd.singular_values[b]
            .partial_cmp(&svd.singular_values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let component = |row: usize, rank: usize| -> f64 {
        order
            .get(rank)
            .map(|&col| u[(row, col)] * svd.singular_values[col])
            .unwrap_or(0.0)
    };
    let scores = (0..n_samples)
        .map(|row| [component(row, 0), component(row, 1)])
        .collect();

    Ok(PcaScores {
        samples: samples.to_vec(),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Sample{i}")).collect()
    }

    #[test]
    fn fewer_than_two_samples_is_an_error() {
        let err = pca_scores(&names(1), &[vec![1.0, 2.0]]).unwrap_err();
        assert_matches!(err, PipelineError::TooFewSamples(1));
    }

    #[test]
    fn two_identical_samples_have_zero_scores() {
        let rows = vec![vec![5.0, 1.0, 3.0], vec![5.0, 1.0, 3.0]];
        let pca = pca_scores(&names(2), &rows).unwrap();
        for score in &pca.scores {
            assert!(score[0].abs() < 1e-9);
            assert!(score[1].abs() < 1e-9);
        }
    }

    #[test]
    fn two_samples_are_mirrored_on_pc1() {
        let rows = vec![vec![10.0, 0.0, 5.0], vec![0.0, 10.0, 5.0]];
        let pca = pca_scores(&names(2), &rows).unwrap();
        // centering leaves the two points symmetric about the origin
        assert!((pca.scores[0][0] + pca.scores[1][0]).abs() < 1e-9);
        assert!(pca.scores[0][0].abs() > 1e-6);
        // rank 1 data, so PC2 carries nothing
        assert!(pca.scores[0][1].abs() < 1e-9);
        assert!(pca.scores[1][1].abs() < 1e-9);
    }

    #[test]
    fn scores_preserve_sample_order() {
        let rows = vec![
            vec![10.0, 0.0],
            vec![0.0, 10.0],
            vec![5.0, 5.0],
        ];
        let pca = pca_scores(&names(3), &rows).unwrap();
        assert_eq!(pca.samples, names(3));
        assert_eq!(pca.scores.len(), 3);
    }
}
