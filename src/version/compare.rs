//! Operator evaluation between the retrieved and the committed version.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::error::CheckError;

/// The finite set of supported comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FromStr for Operator {
    type Err = CheckError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "=" | "==" | "===" => Ok(Operator::Eq),
            "!=" | "!==" | "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            _ => Err(CheckError::UnsupportedOperator(raw.to_string())),
        }
    }
}

impl Operator {
    /// Evaluate `left OP right` by semver precedence. Build metadata is
    /// ignored, matching npm's comparison semantics.
    pub fn evaluate(self, left: &Version, right: &Version) -> bool {
        let ordering = left.cmp_precedence(right);
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Tri-state result of a comparison. `Unknown` means no version could be
/// selected on the registry, so nothing was compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    True,
    False,
    Unknown,
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOutcome::True => write!(f, "true"),
            ComparisonOutcome::False => write!(f, "false"),
            ComparisonOutcome::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Compare the selected registry version against the committed one,
/// applied as `selected OP committed`.
pub fn compare(
    operator: Operator,
    selected: Option<&Version>,
    committed: &Version,
) -> ComparisonOutcome {
    match selected {
        None => ComparisonOutcome::Unknown,
        Some(selected) => {
            if operator.evaluate(selected, committed) {
                ComparisonOutcome::True
            } else {
                ComparisonOutcome::False
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[rstest]
    #[case("=", Operator::Eq)]
    #[case("==", Operator::Eq)]
    #[case("===", Operator::Eq)]
    #[case("!=", Operator::Ne)]
    #[case("!==", Operator::Ne)]
    #[case("<>", Operator::Ne)]
    #[case(">", Operator::Gt)]
    #[case(">=", Operator::Gte)]
    #[case("<", Operator::Lt)]
    #[case("<=", Operator::Lte)]
    fn every_operator_spelling_parses(#[case] raw: &str, #[case] expected: Operator) {
        assert_eq!(raw.parse::<Operator>().unwrap(), expected);
    }

    #[test]
    fn unknown_operator_symbols_are_rejected() {
        assert!(matches!(
            "~=".parse::<Operator>(),
            Err(CheckError::UnsupportedOperator(_))
        ));
    }

    #[rstest]
    #[case(Operator::Eq, "1.0.0", "1.0.0", true)]
    #[case(Operator::Eq, "1.0.0", "1.0.1", false)]
    #[case(Operator::Ne, "1.0.0", "1.0.1", true)]
    #[case(Operator::Ne, "1.0.0", "1.0.0", false)]
    #[case(Operator::Gt, "2.0.0", "1.9.0", true)]
    #[case(Operator::Gt, "1.9.0", "1.9.0", false)]
    #[case(Operator::Gte, "1.9.0", "1.9.0", true)]
    #[case(Operator::Gte, "1.8.0", "1.9.0", false)]
    #[case(Operator::Lt, "1.0.0", "2.0.0", true)]
    #[case(Operator::Lt, "2.0.0", "2.0.0", false)]
    #[case(Operator::Lte, "2.0.0", "2.0.0", true)]
    #[case(Operator::Lte, "2.0.0", "1.9.0", false)]
    fn evaluate_orders_left_against_right(
        #[case] operator: Operator,
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(operator.evaluate(&v(left), &v(right)), expected);
    }

    #[test]
    fn build_metadata_does_not_affect_equality() {
        assert!(Operator::Eq.evaluate(&v("1.0.0+build.1"), &v("1.0.0")));
    }

    #[test]
    fn compare_without_a_selected_version_is_unknown() {
        let committed = v("1.0.0");
        assert_eq!(
            compare(Operator::Gt, None, &committed),
            ComparisonOutcome::Unknown
        );
    }

    #[test]
    fn compare_applies_selected_op_committed() {
        let selected = v("2.0.0");
        let committed = v("1.9.0");

        assert_eq!(
            compare(Operator::Gt, Some(&selected), &committed),
            ComparisonOutcome::True
        );
        assert_eq!(
            compare(Operator::Lte, Some(&selected), &committed),
            ComparisonOutcome::False
        );
    }

    #[test]
    fn outcome_display_matches_output_values() {
        assert_eq!(ComparisonOutcome::True.to_string(), "true");
        assert_eq!(ComparisonOutcome::False.to_string(), "false");
        assert_eq!(ComparisonOutcome::Unknown.to_string(), "UNKNOWN");
    }
}
