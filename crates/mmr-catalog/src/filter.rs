//! Coefficient filters in the `--integers` form.

use std::fmt;
use std::str::FromStr;

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::Resonance;

/// Comparison applied to one longitude coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerFilter {
    /// `*`, matches anything.
    Any,
    /// `N` or `==N`.
    Eq(i32),
    /// `!=N`.
    Ne(i32),
    /// `>N`.
    Gt(i32),
    /// `>=N`.
    Ge(i32),
    /// `<N`.
    Lt(i32),
    /// `<=N`.
    Le(i32),
}

impl IntegerFilter {
    /// True when the coefficient passes the comparison.
    pub fn matches(self, value: i32) -> bool {
        match self {
            IntegerFilter::Any => true,
            IntegerFilter::Eq(n) => value == n,
            IntegerFilter::Ne(n) => value != n,
            IntegerFilter::Gt(n) => value > n,
            IntegerFilter::Ge(n) => value >= n,
            IntegerFilter::Lt(n) => value < n,
            IntegerFilter::Le(n) => value <= n,
        }
    }
}

impl FromStr for IntegerFilter {
    type Err = MmrError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let expr = expr.trim();
        if expr == "*" {
            return Ok(IntegerFilter::Any);
        }
        let (ctor, number): (fn(i32) -> IntegerFilter, &str) =
            if let Some(rest) = expr.strip_prefix("==") {
                (IntegerFilter::Eq, rest)
            } else if let Some(rest) = expr.strip_prefix("!=") {
                (IntegerFilter::Ne, rest)
            } else if let Some(rest) = expr.strip_prefix(">=") {
                (IntegerFilter::Ge, rest)
            } else if let Some(rest) = expr.strip_prefix("<=") {
                (IntegerFilter::Le, rest)
            } else if let Some(rest) = expr.strip_prefix('>') {
                (IntegerFilter::Gt, rest)
            } else if let Some(rest) = expr.strip_prefix('<') {
                (IntegerFilter::Lt, rest)
            } else {
                (IntegerFilter::Eq, expr)
            };
        number.trim().parse::<i32>().map(ctor).map_err(|err| {
            MmrError::Catalog(
                ErrorInfo::new(codes::INVALID_CONFIG, format!("bad integer filter: {err}"))
                    .with_context("expression", expr.to_string()),
            )
        })
    }
}

impl fmt::Display for IntegerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerFilter::Any => write!(f, "*"),
            IntegerFilter::Eq(n) => write!(f, "{n}"),
            IntegerFilter::Ne(n) => write!(f, "!={n}"),
            IntegerFilter::Gt(n) => write!(f, ">{n}"),
            IntegerFilter::Ge(n) => write!(f, ">={n}"),
            IntegerFilter::Lt(n) => write!(f, "<{n}"),
            IntegerFilter::Le(n) => write!(f, "<={n}"),
        }
    }
}

/// One filter per body, applied to the longitude coefficients planets first.
///
/// Missing trailing filters match anything, so an empty filter accepts all
/// resonances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoefficientFilter {
    filters: Vec<IntegerFilter>,
}

impl CoefficientFilter {
    /// Parses one expression per body.
    pub fn parse<S: AsRef<str>>(expressions: &[S]) -> Result<Self, MmrError> {
        let filters = expressions
            .iter()
            .map(|expr| expr.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    /// Checks every configured comparison against the resonance.
    pub fn matches(&self, resonance: &Resonance) -> bool {
        resonance
            .longitude_coeffs()
            .into_iter()
            .zip(&self.filters)
            .all(|(value, filter)| filter.matches(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_operator() {
        let cases = [
            ("*", IntegerFilter::Any),
            ("4", IntegerFilter::Eq(4)),
            ("==-2", IntegerFilter::Eq(-2)),
            ("!=0", IntegerFilter::Ne(0)),
            (">1", IntegerFilter::Gt(1)),
            (">=1", IntegerFilter::Ge(1)),
            ("<-1", IntegerFilter::Lt(-1)),
            ("<=3", IntegerFilter::Le(3)),
        ];
        for (expr, expected) in cases {
            assert_eq!(expr.parse::<IntegerFilter>().unwrap(), expected, "{expr}");
        }
        assert!("=>2".parse::<IntegerFilter>().is_err());
    }

    #[test]
    fn filters_longitude_coefficients() {
        let planets = vec!["JUPITER".to_string(), "SATURN".to_string()];
        let resonance =
            Resonance::from_integers(&planets, &[4, -2, -1, 0, 0, -1], 2.7651, "A1").unwrap();
        assert!(CoefficientFilter::parse(&[">3", "*", "<0"]).unwrap().matches(&resonance));
        assert!(!CoefficientFilter::parse(&["5"]).unwrap().matches(&resonance));
        assert!(CoefficientFilter::default().matches(&resonance));
    }
}
