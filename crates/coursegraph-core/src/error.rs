use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoCatalog,
    ConfigParseError,
    CatalogNotFound,
    CatalogParseError,
    UnsupportedCatalogFormat,
    CycleDetected,
    InvalidCommand,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoCatalog => "E1001",
            Self::ConfigParseError => "E1002",
            Self::CatalogNotFound => "E1003",
            Self::CatalogParseError => "E1004",
            Self::UnsupportedCatalogFormat => "E1005",
            Self::CycleDetected => "E2003",
            Self::InvalidCommand => "E2005",
        }
    }

    /// Short human-facing summary.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoCatalog => "No catalog configured",
            Self::ConfigParseError => "Config file parse error",
            Self::CatalogNotFound => "Catalog file not found",
            Self::CatalogParseError => "Catalog file parse error",
            Self::UnsupportedCatalogFormat => "Unsupported catalog format",
            Self::CycleDetected => "Cyclic prerequisite detected",
            Self::InvalidCommand => "Invalid command",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NoCatalog => Some(
                "Pass --catalog <FILE> or list files under [catalog] in .coursegraph/config.toml.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .coursegraph/config.toml and retry."),
            Self::CatalogNotFound => Some("Check the catalog path and read permissions."),
            Self::CatalogParseError => {
                Some("Catalogs map course codes to lists of [code, \"prereq\"|\"coreq\"] pairs.")
            }
            Self::UnsupportedCatalogFormat => Some("Use a .json, .yaml or .yml catalog file."),
            Self::CycleDetected => Some(
                "Run `cgraph cycles` to see the loop, then exclude one of its courses.",
            ),
            Self::InvalidCommand => Some("Type `help` to list commands."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
