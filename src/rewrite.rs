//! Heuristic rewriting of C++ type spellings into Python type expressions.
//!
//! The rewriter is a pure function over a frozen alias table: qualifiers are
//! stripped, exact matches are chased through the table with cycle
//! protection, `std::vector` becomes `list[...]`, and anything else degrades
//! to a sanitized placeholder rather than failing.

use std::collections::HashSet;

use thiserror::Error;

use crate::registry::AliasTable;

/// Spellings understood without any documentation lookup: primitives plus
/// the Eigen dense types the bound API trafficks in.
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("std::string", "str"),
    ("double", "float"),
    ("int", "int"),
    ("bool", "bool"),
    ("Eigen::MatrixXd", "numpy.ndarray"),
    ("Eigen::VectorXd", "numpy.ndarray"),
    ("Eigen::Matrix3d", "numpy.ndarray"),
    ("Eigen::Vector3d", "numpy.ndarray"),
    ("Eigen::Matrix2d", "numpy.ndarray"),
    ("Eigen::Vector2d", "numpy.ndarray"),
    ("Eigen::Affine3d", "numpy.ndarray"),
    ("void", "None"),
];

/// Upper bound on alias-chain hops; a deeper chain indicates malformed
/// documentation rather than a legitimate alias graph.
const MAX_ALIAS_HOPS: usize = 32;

const VECTOR_PREFIX: &str = "std::vector<";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("alias cycle detected while resolving `{spelling}`")]
    CycleDetected { spelling: String },
    #[error("alias chain for `{spelling}` exceeds {limit} hops")]
    HopLimitExceeded { spelling: String, limit: usize },
}

/// Outcome of a single rewrite. `fallback` marks spellings that matched no
/// alias and no container form and were only sanitized; callers should
/// surface those for human review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub canonical: String,
    pub fallback: bool,
}

/// Rewrite one raw type spelling into its canonical Python expression.
pub fn rewrite_type(raw: &str, aliases: &AliasTable) -> Result<Rewrite, ResolutionError> {
    let stripped = strip_qualifiers(raw);

    if let Some(value) = aliases.get(&stripped) {
        let canonical = follow_chain(&stripped, value.to_string(), aliases)?;
        return Ok(Rewrite {
            canonical,
            fallback: false,
        });
    }

    if let Some(element) = container_element(&stripped) {
        let inner = rewrite_type(element, aliases)?;
        return Ok(Rewrite {
            canonical: format!("list[{}]", inner.canonical),
            fallback: inner.fallback,
        });
    }

    Ok(Rewrite {
        canonical: sanitize(&stripped),
        fallback: true,
    })
}

/// Drop reference/pointer markers, surrounding whitespace and one leading
/// `const` qualifier.
fn strip_qualifiers(raw: &str) -> String {
    let without_markers: String = raw.chars().filter(|&c| c != '&' && c != '*').collect();
    let trimmed = without_markers.trim();
    trimmed
        .strip_prefix("const ")
        .map_or(trimmed, str::trim_start)
        .to_string()
}

/// Chase an alias chain until the first value that is not itself a table
/// key. Each hop is stripped like a fresh spelling, so a typedef whose
/// underlying type carries qualifiers still resolves.
fn follow_chain(
    origin: &str,
    mut value: String,
    aliases: &AliasTable,
) -> Result<String, ResolutionError> {
    let mut visited = HashSet::from([origin.to_string()]);
    for _ in 0..MAX_ALIAS_HOPS {
        let stripped = strip_qualifiers(&value);
        match aliases.get(&stripped) {
            None => return Ok(stripped),
            // Identity entries (`int` -> `int`) are resolved fixed points,
            // not cycles.
            Some(next) if next == stripped => return Ok(stripped),
            Some(next) => {
                if !visited.insert(stripped.clone()) {
                    return Err(ResolutionError::CycleDetected {
                        spelling: origin.to_string(),
                    });
                }
                value = next.to_string();
            }
        }
    }
    Err(ResolutionError::HopLimitExceeded {
        spelling: origin.to_string(),
        limit: MAX_ALIAS_HOPS,
    })
}

fn container_element(spelling: &str) -> Option<&str> {
    let inner = spelling
        .strip_prefix(VECTOR_PREFIX)?
        .strip_suffix('>')?;
    Some(inner.trim())
}

/// Last-resort placeholder: every character outside alphanumerics and dot
/// becomes an underscore. Total by construction.
fn sanitize(spelling: &str) -> String {
    spelling
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}
