//! Header badge showing how many users are selected.

use std::fmt;

use crate::selection::SelectionModel;

/// Derived from the selection count only: hidden at zero, the count otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderBadge {
    Hidden,
    Count(usize),
}

impl HeaderBadge {
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            HeaderBadge::Hidden
        } else {
            HeaderBadge::Count(count)
        }
    }

    pub fn for_selection(selection: &SelectionModel) -> Self {
        Self::from_count(selection.count())
    }

    /// Text to render, or `None` when nothing should be shown.
    pub fn text(&self) -> Option<String> {
        match self {
            HeaderBadge::Hidden => None,
            HeaderBadge::Count(n) => Some(n.to_string()),
        }
    }
}

impl fmt::Display for HeaderBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderBadge::Hidden => Ok(()),
            HeaderBadge::Count(n) => write!(f, "{}", n),
        }
    }
}
