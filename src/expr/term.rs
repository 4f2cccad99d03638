//! Single comparator terms such as `>≈1.8` or `1.12.2`

use crate::expr::errors::ExpressionError;
use crate::version::GameVersion;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Approximately-equal sign used by the annotation grammar.
pub const APPROX: char = '≈';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparator {
    /// No prefix, or a bare `≈`
    #[default]
    Equivalent,
    /// `>`
    Greater,
    /// `>≈`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<≈`
    LessOrEqual,
}

impl Comparator {
    /// Whether `ordering` (running version compared to the bound) satisfies
    /// this comparator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Equivalent => ordering == Ordering::Equal,
            Comparator::Greater => ordering == Ordering::Greater,
            Comparator::GreaterOrEqual => ordering != Ordering::Less,
            Comparator::Less => ordering == Ordering::Less,
            Comparator::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equivalent => "",
            Comparator::Greater => ">",
            Comparator::GreaterOrEqual => ">≈",
            Comparator::Less => "<",
            Comparator::LessOrEqual => "<≈",
        }
    }
}

/// A comparator applied to a (possibly partial) version bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    pub comparator: Comparator,
    pub bound: GameVersion,
}

impl Term {
    pub fn new(comparator: Comparator, bound: GameVersion) -> Self {
        Self { comparator, bound }
    }

    /// Parse `[comparator] major[.minor[.revision]]`.
    ///
    /// The comparator is an optional `<` or `>` followed by an optional `≈`.
    /// No whitespace is allowed anywhere in the term.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        let mut rest = input;

        let relation = if let Some(stripped) = rest.strip_prefix('>') {
            rest = stripped;
            Some(Ordering::Greater)
        } else if let Some(stripped) = rest.strip_prefix('<') {
            rest = stripped;
            Some(Ordering::Less)
        } else {
            None
        };

        let approx = match rest.strip_prefix(APPROX) {
            Some(stripped) => {
                rest = stripped;
                true
            }
            None => false,
        };

        let comparator = match (relation, approx) {
            (None, _) => Comparator::Equivalent,
            (Some(Ordering::Greater), false) => Comparator::Greater,
            (Some(Ordering::Greater), true) => Comparator::GreaterOrEqual,
            (Some(_), false) => Comparator::Less,
            (Some(_), true) => Comparator::LessOrEqual,
        };

        let bound = parse_bound(input, rest)?;
        Ok(Term::new(comparator, bound))
    }

    pub fn matches(&self, running: &GameVersion) -> bool {
        self.comparator.accepts(running.compare(&self.bound))
    }
}

fn parse_bound(input: &str, digits: &str) -> Result<GameVersion, ExpressionError> {
    if digits.is_empty() {
        return Err(ExpressionError::malformed(input, "missing version number"));
    }

    let mut components = Vec::with_capacity(3);
    for part in digits.split('.') {
        if part.is_empty() {
            return Err(ExpressionError::malformed(input, "empty version component"));
        }
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ExpressionError::malformed(
                input,
                format!("'{}' is not a non-negative integer", part),
            ));
        }
        let value: u32 = part
            .parse()
            .map_err(|_| ExpressionError::malformed(input, "version component out of range"))?;
        components.push(value);
    }

    match components.as_slice() {
        [major] => Ok(GameVersion::major_only(*major)),
        [major, minor] => Ok(GameVersion::major_minor(*major, *minor)),
        [major, minor, revision] => Ok(GameVersion::new(*major, *minor, *revision)),
        _ => Err(ExpressionError::malformed(
            input,
            "at most three version components are allowed",
        )),
    }
}

impl FromStr for Term {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Term::parse(s)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.comparator.symbol(), self.bound)
    }
}
