//! # Error Hierarchy
//!
//! Three-way taxonomy:
//!
//! - [`ConfigError`] — bad thresholds, epsilon, weights. Fatal: raised at
//!   monitor construction, never recovered at cycle time.
//! - [`ContractViolation`] — the state provider or objective function broke
//!   its contract (non-finite values, missing layers, wrong arity). Never
//!   propagated past the controller boundary; converted to a critical
//!   `invalid_input` violation scoped to the offending layer.
//! - [`ObjectiveError`] — returned by [`ObjectiveFn`](crate::ObjectiveFn)
//!   implementations; swallowed into a contract violation by the estimator.
//!
//! Numerical degeneracy (near-zero determinant, infinite condition number)
//! is deliberately **not** an error anywhere in this hierarchy — it is
//! represented as data and judged by the threshold gates.

use thiserror::Error;

use crate::layer::Layer;

/// Fatal configuration errors, raised eagerly at construction.
///
/// A monitor holding one of these was never built; there is no recovery
/// path and no partially-configured state to clean up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The finite-difference step must be strictly positive.
    #[error("finite-difference epsilon must be > 0, got {epsilon}")]
    NonPositiveEpsilon {
        /// The rejected step size.
        epsilon: f64,
    },

    /// A layer weight was negative.
    #[error("aggregation weight for layer {layer} must be >= 0, got {weight}")]
    NegativeWeight {
        /// The offending layer.
        layer: Layer,
        /// The rejected weight.
        weight: f64,
    },

    /// All layer weights were zero — the weighted mean is undefined.
    #[error("sum of aggregation weights must be > 0")]
    ZeroWeightSum,

    /// A per-layer threshold was negative or non-finite.
    #[error("threshold `{name}` for layer {layer} must be a finite value >= 0, got {value}")]
    InvalidThreshold {
        /// The offending layer.
        layer: Layer,
        /// The threshold field name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The operational authorization threshold must lie in [0, 1].
    #[error("authorization threshold must be in [0, 1], got {value}")]
    AuthorizationThresholdOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// The report history ring buffer cannot have capacity zero.
    #[error("history capacity must be >= 1")]
    ZeroHistoryCapacity,

    /// The configuration file could not be parsed.
    #[error("failed to parse monitor configuration: {reason}")]
    Parse {
        /// Parser diagnostic.
        reason: String,
    },
}

/// Input-contract violations from external collaborators.
///
/// These are recovered per layer: the controller converts them into a
/// critical, pause-requiring `invalid_input` violation and continues the
/// cycle for the remaining layers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    /// A state component was NaN or infinite.
    #[error("non-finite value in layer {layer}, component `{component}`")]
    NonFiniteComponent {
        /// The layer containing the bad component.
        layer: Layer,
        /// The component name.
        component: String,
    },

    /// The snapshot is missing a declared layer.
    #[error("snapshot for system is missing layer {layer}")]
    MissingLayer {
        /// The absent layer.
        layer: Layer,
    },

    /// A layer name outside the closed [`Layer`] set.
    #[error("unknown layer name `{name}`")]
    UnknownLayer {
        /// The unrecognized name.
        name: String,
    },

    /// A layer exceeded the dimension cap required by the cofactor
    /// determinant (O(n!) — see `argus-matrix`).
    #[error("layer {layer} has {len} components, exceeding the cap of {cap}")]
    DimensionCapExceeded {
        /// The offending layer.
        layer: Layer,
        /// Declared component count.
        len: usize,
        /// The hard cap.
        cap: usize,
    },

    /// A system identifier was empty or whitespace.
    #[error("system id must be non-empty")]
    EmptySystemId,

    /// The objective function failed or returned a malformed reward vector.
    #[error("objective failed for layer {layer}: {source}")]
    ObjectiveFailed {
        /// The layer being differentiated.
        layer: Layer,
        /// The underlying objective error.
        #[source]
        source: ObjectiveError,
    },

    /// The objective returned a non-finite reward component.
    #[error("objective produced a non-finite reward at index {index} for layer {layer}")]
    NonFiniteReward {
        /// The layer being differentiated.
        layer: Layer,
        /// Index of the bad reward component.
        index: usize,
    },
}

/// Errors surfaced by [`ObjectiveFn`](crate::ObjectiveFn) implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectiveError {
    /// The objective could not be evaluated for this input.
    #[error("objective evaluation failed: {reason}")]
    Evaluation {
        /// Implementation-provided diagnostic.
        reason: String,
    },

    /// The input vector length did not match the objective's declared arity.
    #[error("objective expected {expected} input components, got {actual}")]
    InputArity {
        /// Declared input length.
        expected: usize,
        /// Observed input length.
        actual: usize,
    },

    /// The reward vector length contradicted the objective's declared
    /// output length, or drifted between evaluations.
    #[error("objective declared {expected} reward components, produced {actual}")]
    OutputArity {
        /// Declared output length.
        expected: usize,
        /// Observed output length.
        actual: usize,
    },
}
