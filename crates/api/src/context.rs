/// Header carrying the caller's pre-validated permission level.
///
/// Set by the upstream auth gateway after token validation; this service
/// never sees the token itself.
pub const PERMISSION_LEVEL_HEADER: &str = "x-permission-level";

/// Caller rank. Ordered: `Admin` satisfies every `User` requirement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionLevel {
    User = 1,
    Admin = 2,
}

impl PermissionLevel {
    /// Parse the header value (`"1"` or `"2"`).
    pub fn from_header_value(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(PermissionLevel::User),
            "2" => Some(PermissionLevel::Admin),
            _ => None,
        }
    }

    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

/// Caller context for a request.
///
/// Immutable; present on every `/catalog` route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    level: PermissionLevel,
}

impl CallerContext {
    pub fn new(level: PermissionLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> PermissionLevel {
        self.level
    }
}
