//! Dialects
//!
//!     Both dialects share the section / key / value / comment structure. They differ in:
//!
//!         - Comment signs: systemd accepts `#` and `;`, mkosi only `#`.
//!         - Continuation: systemd continues a line with a trailing backslash, mkosi continues
//!           a value on the following lines when they are indented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Systemd,
    Mkosi,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect '{0}' (expected 'systemd' or 'mkosi')")]
pub struct UnknownDialect(pub String);

impl Dialect {
    pub fn is_comment_sign(self, ch: char) -> bool {
        match self {
            Dialect::Systemd => ch == '#' || ch == ';',
            Dialect::Mkosi => ch == '#',
        }
    }

    /// Whether a trailing backslash continues the current line.
    pub fn supports_escapes(self) -> bool {
        self == Dialect::Systemd
    }

    /// Whether indented lines continue the previous value.
    pub fn supports_indented_continuation(self) -> bool {
        self == Dialect::Mkosi
    }

    /// Pick the dialect from a file path.
    ///
    /// `mkosi.conf`, `mkosi.<anything>.conf` and `.conf` files inside a `mkosi.conf.d` or
    /// `mkosi.<anything>.d` directory are mkosi files; everything else is a systemd unit.
    pub fn detect(path: &Path) -> Self {
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
        if file_name == "mkosi.conf"
            || (file_name.starts_with("mkosi.") && file_name.ends_with(".conf"))
        {
            return Dialect::Mkosi;
        }

        let in_mkosi_dir = path
            .parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str())
            .is_some_and(|dir| dir.starts_with("mkosi.") && dir.ends_with(".d"));
        if in_mkosi_dir && file_name.ends_with(".conf") {
            Dialect::Mkosi
        } else {
            Dialect::Systemd
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Systemd => "systemd",
            Dialect::Mkosi => "mkosi",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "systemd" => Ok(Dialect::Systemd),
            "mkosi" => Ok(Dialect::Mkosi),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}
