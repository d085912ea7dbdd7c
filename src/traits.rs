use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Domain constraint on a parameter or on the support of a
/// distribution. Declared as plain data so a host inference framework
/// can validate or transform arguments without any class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Any finite real number
    Real,
    /// Strictly positive real number
    Positive,
    /// Open unit interval `(0, 1)`
    UnitInterval,
}

impl Constraint {
    /// Membership test for a single scalar
    pub fn contains(&self, x: f64) -> bool {
        match self {
            Constraint::Real => x.is_finite(),
            Constraint::Positive => x.is_finite() && x > 0.0,
            Constraint::UnitInterval => x > 0.0 && x < 1.0,
        }
    }
}

/// An immutable random-state token passed by value into `sample`.
///
/// The crate never holds or advances global random state: a key
/// deterministically seeds a fresh generator per call, so two calls
/// with the same key return identical draws. Distinct per-call keys
/// are derived with [`RngKey::fold_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngKey(u64);

impl RngKey {
    /// Create a key from a seed
    pub fn new(seed: u64) -> Self {
        RngKey(seed)
    }

    /// Derive a child key from this key and extra data. Different
    /// `data` values give (with overwhelming probability) different
    /// child keys, so callers can thread one root key through many
    /// independent `sample` calls.
    pub fn fold_in(&self, data: u64) -> Self {
        // SplitMix64 finalizer over (seed, data)
        let mut z = self.0 ^ data.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        RngKey(z ^ (z >> 31))
    }

    pub(crate) fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}

/// Capability set shared by the CAR distributions: constraint
/// declarations for the host framework, shape bookkeeping, sampling,
/// and log-density evaluation.
pub trait Distribution {
    /// Per-parameter domain constraints, `(name, constraint)`
    fn arg_constraints(&self) -> Vec<(&'static str, Constraint)>;

    /// Domain of the values accepted by `log_prob`
    fn support(&self) -> Constraint;

    /// Broadcast shape of the distribution parameters
    fn batch_shape(&self) -> &[usize];

    /// Shape of a single event (empty for these distributions)
    fn event_shape(&self) -> &[usize] {
        &[]
    }

    /// Draw of shape `sample_shape + batch_shape + event_shape`,
    /// deterministic given `key`
    fn sample(&self, key: RngKey, sample_shape: &[usize]) -> anyhow::Result<ArrayD<f64>>;

    /// Log-density of a length-N value vector over the graph nodes
    fn log_prob(&self, value: ArrayView1<f64>) -> anyhow::Result<f64>;
}

/// Broadcast two shapes under the usual right-aligned rule: trailing
/// axes must be equal or one of them 1. Errors (rather than coercing)
/// on incompatible shapes.
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> anyhow::Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut out = vec![1_usize; ndim];

    for k in 0..ndim {
        let a = if k < lhs.len() { lhs[lhs.len() - 1 - k] } else { 1 };
        let b = if k < rhs.len() { rhs[rhs.len() - 1 - k] } else { 1 };

        out[ndim - 1 - k] = if a == b || b == 1 {
            a
        } else if a == 1 {
            b
        } else {
            anyhow::bail!("incompatible shapes: {:?} vs {:?}", lhs, rhs);
        };
    }

    Ok(out)
}

/// `loc + eps * scale` with `eps ~ N(0, 1)` of shape
/// `sample_shape + batch_shape`.
///
/// Both distributions fall back to this reparametrized-normal rule;
/// it is not a draw from the spatial density the `log_prob` methods
/// define. See the note on `SparseCar::sample`.
pub(crate) fn reparametrized_normal(
    key: RngKey,
    sample_shape: &[usize],
    batch_shape: &[usize],
    loc: &ArrayD<f64>,
    scale: &ArrayD<f64>,
) -> anyhow::Result<ArrayD<f64>> {
    let mut full = sample_shape.to_vec();
    full.extend_from_slice(batch_shape);

    let mut rng = key.rng();
    let len = full.iter().product::<usize>();
    let eps: Vec<f64> = (0..len).map(|_| rng.sample(StandardNormal)).collect();
    let eps = ArrayD::from_shape_vec(IxDyn(&full), eps)?;

    let loc_b = loc
        .broadcast(IxDyn(&full))
        .ok_or_else(|| anyhow::anyhow!("loc {:?} does not broadcast to {:?}", loc.shape(), full))?;
    let scale_b = scale.broadcast(IxDyn(&full)).ok_or_else(|| {
        anyhow::anyhow!("scale {:?} does not broadcast to {:?}", scale.shape(), full)
    })?;

    Ok(&loc_b + &(&eps * &scale_b))
}

/// Shared construction-time parameter handling: fix the batch shape
/// from `loc`/`scale` and optionally validate the scale domain.
pub(crate) fn check_loc_scale(
    loc: &ArrayD<f64>,
    scale: &ArrayD<f64>,
    validate_args: bool,
) -> anyhow::Result<Vec<usize>> {
    let batch_shape = broadcast_shapes(loc.shape(), scale.shape())?;

    if validate_args && !scale.iter().all(|&s| Constraint::Positive.contains(s)) {
        anyhow::bail!("scale parameter violates the positivity constraint");
    }

    Ok(batch_shape)
}

/// Validate a value vector against the distribution support before
/// evaluating the density body.
pub(crate) fn validate_value(value: &ArrayView1<f64>, support: Constraint) -> anyhow::Result<()> {
    if !value.iter().all(|&v| support.contains(v)) {
        anyhow::bail!("value lies outside the {:?} support", support);
    }
    Ok(())
}
