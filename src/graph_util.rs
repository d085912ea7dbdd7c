use log::debug;
use ndarray::prelude::*;
use ndarray_linalg::{EigValsh, UPLO};

/// Read the edge list off a symmetric 0/1 adjacency matrix.
///
/// Scans the strict upper triangle row-major, so the output is
/// deterministic for identical input: unique pairs `(i, j)` with
/// `i < j` and `W[i][j] == 1`.
///
/// * `weights` - `N x N` symmetric adjacency matrix with zero diagonal
///   (symmetry is a documented precondition, only the upper triangle
///   is read)
pub fn weights_to_edgelist(weights: &Array2<f64>) -> anyhow::Result<Vec<(usize, usize)>> {
    let nn = weights.nrows();
    if weights.ncols() != nn {
        anyhow::bail!("adjacency matrix must be square, got {:?}", weights.dim());
    }

    let mut edges = Vec::new();
    for ii in 0..nn {
        for jj in (ii + 1)..nn {
            if weights[[ii, jj]] == 1.0 {
                edges.push((ii, jj));
            }
        }
    }

    debug!("extracted {} edges from {} nodes", edges.len(), nn);
    Ok(edges)
}

/// Rebuild the symmetric `n x n` adjacency matrix from an edge list,
/// setting both `(i, j)` and `(j, i)` to 1 for each listed edge.
///
/// * `edges` - unique unordered node pairs
/// * `nn` - number of nodes; every edge index must lie in `[0, nn)`
pub fn edgelist_to_weights(edges: &[(usize, usize)], nn: usize) -> anyhow::Result<Array2<f64>> {
    let mut weights = Array2::<f64>::zeros((nn, nn));

    for &(ii, jj) in edges {
        if ii >= nn || jj >= nn {
            anyhow::bail!("edge ({}, {}) out of range for {} nodes", ii, jj, nn);
        }
        weights[[ii, jj]] = 1.0;
        weights[[jj, ii]] = 1.0;
    }

    Ok(weights)
}

/// Number of neighbours of each node (row sums of the adjacency
/// matrix)
pub fn degree_vector(weights: &Array2<f64>) -> Array1<f64> {
    weights.sum_axis(Axis(1))
}

/// Eigenvalues of the symmetric normalized adjacency
/// `D^{-1/2} W D^{-1/2}`, ascending.
///
/// For a connected-enough graph (every degree >= 1) the spectrum is
/// real and lies in `[-1, 1]`. A zero-degree node makes the
/// normalization divide by zero; the resulting NaN entries are not
/// guarded here and propagate into the eigen-decomposition.
pub fn sparse_car_eigenvals(weights: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
    let nn = weights.nrows();
    if weights.ncols() != nn {
        anyhow::bail!("adjacency matrix must be square, got {:?}", weights.dim());
    }

    let inv_sqrt_degree = degree_vector(weights).mapv(|d| 1.0 / d.sqrt());

    // D^{-1/2} W D^{-1/2} without materializing the diagonal matrices
    let mut normalized = weights.clone();
    for ((ii, jj), w_ij) in normalized.indexed_iter_mut() {
        *w_ij *= inv_sqrt_degree[ii] * inv_sqrt_degree[jj];
    }

    // LAPACK symmetric solver returns eigenvalues in ascending order
    let eigenvals = normalized.eigvalsh(UPLO::Lower)?;
    Ok(eigenvals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn two_node_edge_list() {
        let weights = array![[0.0, 1.0], [1.0, 0.0]];
        let edges = weights_to_edgelist(&weights).unwrap();
        assert_eq!(edges, vec![(0, 1)]);
    }

    #[test]
    fn upper_triangle_scan_is_row_major() {
        // path graph 0 - 1 - 2 plus a chord 0 - 2
        let weights = array![[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        let edges = weights_to_edgelist(&weights).unwrap();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn rejects_out_of_range_edges() {
        assert!(edgelist_to_weights(&[(0, 3)], 3).is_err());
    }

    #[test]
    fn degree_is_row_sum() {
        let weights = array![[0.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(degree_vector(&weights), array![2.0, 1.0, 1.0]);
    }
}
