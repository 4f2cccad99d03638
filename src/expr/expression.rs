//! Flat boolean expressions over version terms
//!
//! ```text
//! expression := andGroup (("," | "&") andGroup)*
//! andGroup   := orTerm ("|" orTerm)*
//! orTerm     := ["!"] term
//! ```
//!
//! There is no grouping. Empty OR segments (`1.8||1.9`) are skipped.

use crate::expr::errors::ExpressionError;
use crate::expr::term::Term;
use crate::version::GameVersion;
use std::fmt;
use std::str::FromStr;

const AND_SEPARATORS: [char; 2] = [',', '&'];
const OR_SEPARATOR: char = '|';
const NOT: char = '!';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrTerm {
    pub negated: bool,
    pub term: Term,
}

impl OrTerm {
    pub fn evaluate(&self, running: &GameVersion) -> bool {
        self.term.matches(running) != self.negated
    }
}

/// Alternatives; satisfied when any of them is. A group left with no terms
/// (every segment was empty) is never satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AndGroup {
    pub terms: Vec<OrTerm>,
}

impl AndGroup {
    pub fn evaluate(&self, running: &GameVersion) -> bool {
        self.terms.iter().any(|term| term.evaluate(running))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    groups: Vec<AndGroup>,
}

impl Expression {
    /// Parse the whole expression up front.
    ///
    /// Every term is validated, including ones that evaluation would never
    /// reach because an earlier group already failed.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        if input.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let groups = input
            .split(AND_SEPARATORS)
            .map(parse_group)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[AndGroup] {
        &self.groups
    }

    /// Satisfied iff every AND-group is; stops at the first failing group.
    pub fn evaluate(&self, running: &GameVersion) -> bool {
        self.groups.iter().all(|group| group.evaluate(running))
    }
}

fn parse_group(segment: &str) -> Result<AndGroup, ExpressionError> {
    let terms = segment
        .split(OR_SEPARATOR)
        .filter(|alternative| !alternative.is_empty())
        .map(|alternative| {
            let (negated, body) = match alternative.strip_prefix(NOT) {
                Some(rest) => (true, rest),
                None => (false, alternative),
            };
            Ok(OrTerm {
                negated,
                term: Term::parse(body)?,
            })
        })
        .collect::<Result<Vec<_>, ExpressionError>>()?;

    Ok(AndGroup { terms })
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            for (j, alternative) in group.terms.iter().enumerate() {
                if j > 0 {
                    f.write_str("|")?;
                }
                if alternative.negated {
                    f.write_str("!")?;
                }
                write!(f, "{}", alternative.term)?;
            }
        }
        Ok(())
    }
}
