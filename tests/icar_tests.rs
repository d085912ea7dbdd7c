use approx::assert_abs_diff_eq;
use ndarray::prelude::*;
use sparse_car::{weights_to_edgelist, Distribution, SparseIcar, SUM_TO_ZERO_SCALE};
use std::f64::consts::PI;

fn scalar(x: f64) -> ArrayD<f64> {
    arr0(x).into_dyn()
}

fn path_edges(nn: usize) -> Vec<(usize, usize)> {
    (0..nn - 1).map(|ii| (ii, ii + 1)).collect()
}

#[test]
fn matches_manual_formula() {
    let edges = path_edges(4);
    let icar = SparseIcar::new(scalar(0.0), scalar(1.0), edges.clone(), true).unwrap();

    let value: Array1<f64> = array![0.5, -0.3, 1.1, -0.9];

    let phi: f64 = edges
        .iter()
        .map(|&(uu, vv)| (value[uu] - value[vv]).powi(2))
        .sum();
    let scale_c = SUM_TO_ZERO_SCALE * 4.0;
    let normalize_term = ((2.0 * PI).sqrt() * scale_c).ln();
    let value_scaled = value.sum() / scale_c;
    let expected = -0.5 * phi - 0.5 * value_scaled.powi(2) - normalize_term;

    assert_abs_diff_eq!(icar.log_prob(value.view()).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn sum_to_zero_value_drops_the_quadratic_penalty() {
    let edges = path_edges(3);
    let icar = SparseIcar::new(scalar(0.0), scalar(1.0), edges.clone(), true).unwrap();

    // sums to exactly zero, so only -0.5 * phi - normalize_term remains
    let value: Array1<f64> = array![1.0, 0.0, -1.0];
    let phi: f64 = edges
        .iter()
        .map(|&(uu, vv)| (value[uu] - value[vv]).powi(2))
        .sum();
    let normalize_term = ((2.0 * PI).sqrt() * SUM_TO_ZERO_SCALE * 3.0).ln();

    assert_abs_diff_eq!(
        icar.log_prob(value.view()).unwrap(),
        -0.5 * phi - normalize_term,
        epsilon = 1e-12
    );
}

#[test]
fn pairwise_penalty_equals_graph_laplacian_form() {
    // phi over the edge list equals vᵀ (D - W) v on the dense graph
    let weights = array![
        [0.0, 1.0, 1.0, 0.0],
        [1.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0]
    ];
    let edges = weights_to_edgelist(&weights).unwrap();
    let value: Array1<f64> = array![0.2, -0.7, 0.4, 1.3];

    let phi_sparse: f64 = edges
        .iter()
        .map(|&(uu, vv)| (value[uu] - value[vv]).powi(2))
        .sum();

    let laplacian = Array2::from_diag(&weights.sum_axis(Axis(1))) - &weights;
    let phi_dense = value.dot(&laplacian.dot(&value));

    assert_abs_diff_eq!(phi_sparse, phi_dense, epsilon = 1e-12);
}

#[test]
fn translation_shifts_only_the_penalty() {
    // the pairwise term is invariant under adding a constant to every
    // node; only the sum-to-zero penalty moves
    let edges = path_edges(5);
    let icar = SparseIcar::new(scalar(0.0), scalar(1.0), edges, true).unwrap();

    let value = array![0.4, -0.4, 0.9, -0.9, 0.0];
    let shifted = &value + 1.0;

    let scale_c = SUM_TO_ZERO_SCALE * 5.0;
    let penalty = |v: &Array1<f64>| -0.5 * (v.sum() / scale_c).powi(2);

    let lp = icar.log_prob(value.view()).unwrap();
    let lp_shifted = icar.log_prob(shifted.view()).unwrap();

    assert_abs_diff_eq!(
        lp - penalty(&value),
        lp_shifted - penalty(&shifted),
        epsilon = 1e-9
    );
}

#[test]
fn rejects_edges_beyond_the_value_length() {
    let icar = SparseIcar::new(scalar(0.0), scalar(1.0), vec![(0, 5)], false).unwrap();
    assert!(icar.log_prob(array![0.0, 1.0].view()).is_err());
}
