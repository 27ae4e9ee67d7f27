/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Every user has exactly one role. Roles expand to permission patterns which
 * may end in a `*` wildcard.
 */

use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::warn;

use super::permissions::{permission, Actions, Areas};

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

lazy_static! {
    pub static ref ROLES: HashMap<String, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            "admin".to_string(),
            Role {
                name: "admin".to_string(),
                description: "Administrator with full access".to_string(),
                permissions: vec!["*".to_string()],
            },
        );

        // Everything but user management.
        let mut manager = Areas::ALL
            .iter()
            .filter(|area| **area != Areas::USERS)
            .map(|area| permission(area, Actions::ALL))
            .collect::<Vec<_>>();
        manager.push(permission(Areas::USERS, Actions::READ));
        roles.insert(
            "manager".to_string(),
            Role {
                name: "manager".to_string(),
                description: "Manager with write access to every business area".to_string(),
                permissions: manager,
            },
        );

        roles.insert(
            "operator".to_string(),
            Role {
                name: "operator".to_string(),
                description: "Field operator recording day-to-day operations".to_string(),
                permissions: vec![
                    permission(Areas::REGISTRY, Actions::READ),
                    permission(Areas::INPUTS, Actions::ALL),
                    permission(Areas::MACHINERY, Actions::ALL),
                    permission(Areas::SEEDS, Actions::ALL),
                    permission(Areas::COMMERCIAL, Actions::READ),
                    permission(Areas::DASHBOARD, Actions::READ),
                ],
            },
        );

        roles.insert(
            "viewer".to_string(),
            Role {
                name: "viewer".to_string(),
                description: "Read-only access to business data".to_string(),
                permissions: Areas::ALL
                    .iter()
                    .filter(|area| **area != Areas::USERS)
                    .map(|area| permission(area, Actions::READ))
                    .collect(),
            },
        );

        roles
    };
}

/// Permission patterns granted to a role. Unknown roles get none.
pub fn role_permissions(role_name: &str) -> Vec<String> {
    match ROLES.get(role_name) {
        Some(role) => role.permissions.clone(),
        None => {
            warn!("Role not found: {}", role_name);
            vec![]
        }
    }
}

/// Check if a granted permission pattern covers a required permission
pub fn check_permission(user_permission: &str, required_permission: &str) -> bool {
    if user_permission == "*" || user_permission == required_permission {
        return true;
    }

    if let Some(area) = user_permission.strip_suffix(":*") {
        return required_permission
            .split_once(':')
            .map_or(false, |(required_area, _)| required_area == area);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn allowed(role: &str, required: &str) -> bool {
        role_permissions(role)
            .iter()
            .any(|granted| check_permission(granted, required))
    }

    #[rstest]
    #[case("admin", "users:write", true)]
    #[case("admin", "finance:write", true)]
    #[case("manager", "finance:write", true)]
    #[case("manager", "users:read", true)]
    #[case("manager", "users:write", false)]
    #[case("operator", "seeds:write", true)]
    #[case("operator", "registry:write", false)]
    #[case("operator", "finance:read", false)]
    #[case("viewer", "seeds:read", true)]
    #[case("viewer", "seeds:write", false)]
    #[case("viewer", "users:read", false)]
    #[case("ghost", "seeds:read", false)]
    fn role_matrix(#[case] role: &str, #[case] required: &str, #[case] expected: bool) {
        assert_eq!(allowed(role, required), expected);
    }

    #[test]
    fn wildcard_matches_whole_area_only() {
        assert!(check_permission("seeds:*", "seeds:write"));
        assert!(!check_permission("seeds:*", "seedsx:write"));
        assert!(!check_permission("seeds:read", "seeds:write"));
    }
}
