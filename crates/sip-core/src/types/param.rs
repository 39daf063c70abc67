//! Generic header parameters

use std::fmt;

/// A `;name` or `;name=value` parameter attached to a header value.
///
/// `value` is `None` for flag parameters (`;lr`), `Some("")` for the
/// tolerated-but-illegal trailing bare `=` form (`;name=`), and the unquoted
/// content for quoted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Flag parameter without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Find a parameter by name, case-insensitively.
pub(crate) fn find_param<'a>(params: &'a [Param], name: &str) -> Option<&'a Param> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
