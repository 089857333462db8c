//! Hash functions and index normalization
//!
//! A [`HashFunction`] is a pure `(key, table_size) -> f64` callable. It is
//! either compiled from a user formula (see [`super::expression`]) or built
//! from a Rust closure. Raw outputs may be fractional, negative or out of
//! range; [`normalize`] folds them into `[0, table_size)`.

use super::expression::Expr;
use super::table_state::Key;
use crate::error::{HashVizError, Result};
use std::fmt;
use std::sync::Arc;

/// Source text of the default primary hash
pub const DEFAULT_PRIMARY_EXPR: &str = "key % tableSize";

/// Source text of the default secondary hash
pub const DEFAULT_SECONDARY_EXPR: &str = "1 + (key % (tableSize - 1))";

/// Arguments of the compile-time smoke test call
const SMOKE_TEST_KEY: Key = 1;
const SMOKE_TEST_TABLE_SIZE: usize = 11;

type HashFn = dyn Fn(Key, usize) -> f64 + Send + Sync;

/// A pluggable `(key, table_size) -> number` function
#[derive(Clone)]
pub struct HashFunction {
    source: String,
    func: Arc<HashFn>,
}

impl HashFunction {
    /// Wrap an arbitrary closure
    ///
    /// `source` is only used for display and trace output.
    pub fn from_fn<S, F>(source: S, func: F) -> Self
    where
        S: Into<String>,
        F: Fn(Key, usize) -> f64 + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            func: Arc::new(func),
        }
    }

    /// Compile a user supplied formula
    ///
    /// The formula is parsed, then evaluated once against a fixed smoke-test
    /// input. Anything that fails to parse or does not produce a finite
    /// number is rejected.
    pub fn compile(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        let expr = Expr::parse(trimmed)?;

        let probe = expr.eval(SMOKE_TEST_KEY, SMOKE_TEST_TABLE_SIZE);
        if !probe.is_finite() {
            return Err(HashVizError::invalid_expression(
                trimmed,
                format!(
                    "evaluates to {} for key={}, tableSize={}",
                    probe, SMOKE_TEST_KEY, SMOKE_TEST_TABLE_SIZE
                ),
            ));
        }

        log::debug!("compiled hash expression '{}' as {}", trimmed, expr);
        Ok(Self::from_fn(trimmed, move |key, table_size| {
            expr.eval(key, table_size)
        }))
    }

    /// Compile `expression`, falling back to `fallback` when it is rejected
    ///
    /// An empty expression selects the fallback silently.
    pub fn compile_or(expression: &str, fallback: HashFunction) -> Self {
        if expression.trim().is_empty() {
            return fallback;
        }
        match Self::compile(expression) {
            Ok(func) => func,
            Err(err) => {
                log::warn!("{}; using '{}' instead", err, fallback.source());
                fallback
            }
        }
    }

    /// Default primary hash: `key mod table_size`
    pub fn default_primary() -> Self {
        Self::from_fn(DEFAULT_PRIMARY_EXPR, |key, table_size| {
            (key % modulus(table_size)) as f64
        })
    }

    /// Default secondary hash: `1 + key mod max(1, table_size - 1)`
    pub fn default_secondary() -> Self {
        Self::from_fn(DEFAULT_SECONDARY_EXPR, |key, table_size| {
            (1 + key % modulus(table_size.saturating_sub(1))) as f64
        })
    }

    /// Evaluate the function
    #[inline]
    pub fn call(&self, key: Key, table_size: usize) -> f64 {
        (self.func)(key, table_size)
    }

    /// Source text the function was built from
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashFunction")
            .field("source", &self.source)
            .finish()
    }
}

/// The primary/secondary pair every probe generator receives
#[derive(Clone, Debug)]
pub struct HashPair {
    /// Home-slot hash used by every mode
    pub primary: HashFunction,
    /// Step hash used by double hashing only
    pub secondary: HashFunction,
}

impl HashPair {
    /// Build a pair from formulas, substituting the defaults for rejected ones
    pub fn compile(primary: &str, secondary: &str) -> Self {
        Self {
            primary: HashFunction::compile_or(primary, HashFunction::default_primary()),
            secondary: HashFunction::compile_or(secondary, HashFunction::default_secondary()),
        }
    }
}

impl Default for HashPair {
    fn default() -> Self {
        Self {
            primary: HashFunction::default_primary(),
            secondary: HashFunction::default_secondary(),
        }
    }
}

/// Table size as an `i64` divisor, at least 1
#[inline]
fn modulus(table_size: usize) -> i64 {
    i64::try_from(table_size).unwrap_or(i64::MAX).max(1)
}

/// Truncate a raw hash value toward zero
///
/// Non-finite values become 0; out-of-range values saturate.
#[inline]
pub fn truncate(raw: f64) -> i64 {
    if raw.is_finite() {
        raw.trunc() as i64
    } else {
        0
    }
}

/// Fold an integer into `[0, table_size)`
///
/// Equivalent to `((r mod m) + m) mod m`.
#[inline]
pub fn fold_index(r: i128, table_size: usize) -> usize {
    debug_assert!(table_size > 0);
    r.rem_euclid(table_size as i128) as usize
}

/// Map a raw hash output to a valid slot index
#[inline]
pub fn normalize(raw: f64, table_size: usize) -> usize {
    fold_index(truncate(raw) as i128, table_size)
}
