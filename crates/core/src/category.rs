// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Handler categories, used for admission control (the blacklist) and for
//! grouping handler definitions in the generated schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse capability tag attached to every registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    File,
    String,
    Time,
    Io,
    Messaging,
    Os,
    Http,
    Hash,
    Math,
    Ai,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::String => "String",
            Self::Time => "Time",
            Self::Io => "I/O",
            Self::Messaging => "Messaging",
            Self::Os => "OS",
            Self::Http => "HTTP",
            Self::Hash => "Hash",
            Self::Math => "Math",
            Self::Ai => "AI",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "File" => Ok(Self::File),
            "String" => Ok(Self::String),
            "Time" => Ok(Self::Time),
            "I/O" | "IO" => Ok(Self::Io),
            "Messaging" => Ok(Self::Messaging),
            "OS" => Ok(Self::Os),
            "HTTP" => Ok(Self::Http),
            "Hash" => Ok(Self::Hash),
            "Math" => Ok(Self::Math),
            "AI" => Ok(Self::Ai),
            other => Err(format!("unknown operation category '{other}'")),
        }
    }
}
