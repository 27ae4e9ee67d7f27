/*!
 * # Permissions Module
 *
 * Permissions are `<area>:<action>` strings. Areas group the REST resources,
 * actions are `read` (GET) and `write` (POST / PUT / DELETE).
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const WRITE: &'static str = "write";
    pub const ALL: &'static str = "*";
}

/// Permission areas
pub struct Areas;

impl Areas {
    pub const REGISTRY: &'static str = "registry";
    pub const INPUTS: &'static str = "inputs";
    pub const MACHINERY: &'static str = "machinery";
    pub const SEEDS: &'static str = "seeds";
    pub const COMMERCIAL: &'static str = "commercial";
    pub const FINANCE: &'static str = "finance";
    pub const DASHBOARD: &'static str = "dashboard";
    pub const USERS: &'static str = "users";

    pub const ALL: [&'static str; 8] = [
        Self::REGISTRY,
        Self::INPUTS,
        Self::MACHINERY,
        Self::SEEDS,
        Self::COMMERCIAL,
        Self::FINANCE,
        Self::DASHBOARD,
        Self::USERS,
    ];
}

/// Builds a permission string.
pub fn permission(area: &str, action: &str) -> String {
    format!("{}:{}", area, action)
}

/// Permission string constants used by the router.
pub mod consts {
    pub const REGISTRY_READ: &str = "registry:read";
    pub const REGISTRY_WRITE: &str = "registry:write";

    pub const INPUTS_READ: &str = "inputs:read";
    pub const INPUTS_WRITE: &str = "inputs:write";

    pub const MACHINERY_READ: &str = "machinery:read";
    pub const MACHINERY_WRITE: &str = "machinery:write";

    pub const SEEDS_READ: &str = "seeds:read";
    pub const SEEDS_WRITE: &str = "seeds:write";

    pub const COMMERCIAL_READ: &str = "commercial:read";
    pub const COMMERCIAL_WRITE: &str = "commercial:write";

    pub const FINANCE_READ: &str = "finance:read";
    pub const FINANCE_WRITE: &str = "finance:write";

    pub const DASHBOARD_READ: &str = "dashboard:read";

    pub const USERS_READ: &str = "users:read";
    pub const USERS_WRITE: &str = "users:write";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_strings_match_constants() {
        assert_eq!(
            permission(Areas::SEEDS, Actions::WRITE),
            consts::SEEDS_WRITE
        );
        assert_eq!(
            permission(Areas::DASHBOARD, Actions::READ),
            consts::DASHBOARD_READ
        );
    }
}
