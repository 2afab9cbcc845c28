//! Role-based authorization: four roles, a hardcoded role→permission table,
//! and the two lookups the rest of the service uses (`has_permission`,
//! `is_admin`). Admin bypasses the table entirely. No dynamic rules, no
//! persistence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    HiringManager,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::HiringManager => "hiring_manager",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            "hiring_manager" => Ok(Role::HiringManager),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewClients,
    CreateClients,
    EditClients,
    DeleteClients,
    ViewJobs,
    CreateJobs,
    EditJobs,
    DeleteJobs,
    ViewCandidates,
    CreateCandidates,
    EditCandidates,
    DeleteCandidates,
    ViewApplications,
    CreateApplications,
    ReviewApplications,
    DeleteApplications,
    ViewInterviews,
    ScheduleInterviews,
    EditInterviews,
    ViewEmails,
    SendEmails,
    ManageEmailTemplates,
    ViewUsers,
    ManageUsers,
    ViewDashboard,
    ViewReports,
    RunConsistencyCheck,
}

const RECRUITER_PERMISSIONS: &[Permission] = &[
    Permission::ViewClients,
    Permission::CreateClients,
    Permission::EditClients,
    Permission::ViewJobs,
    Permission::CreateJobs,
    Permission::EditJobs,
    Permission::ViewCandidates,
    Permission::CreateCandidates,
    Permission::EditCandidates,
    Permission::ViewApplications,
    Permission::CreateApplications,
    Permission::ReviewApplications,
    Permission::ViewInterviews,
    Permission::ScheduleInterviews,
    Permission::EditInterviews,
    Permission::ViewEmails,
    Permission::SendEmails,
    Permission::ManageEmailTemplates,
    Permission::ViewDashboard,
    Permission::ViewReports,
];

const HIRING_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ViewClients,
    Permission::ViewJobs,
    Permission::ViewCandidates,
    Permission::ViewApplications,
    Permission::ReviewApplications,
    Permission::ViewInterviews,
    Permission::ScheduleInterviews,
    Permission::ViewEmails,
    Permission::ViewDashboard,
    Permission::ViewReports,
];

const VIEWER_PERMISSIONS: &[Permission] = &[
    Permission::ViewClients,
    Permission::ViewJobs,
    Permission::ViewCandidates,
    Permission::ViewApplications,
    Permission::ViewInterviews,
    Permission::ViewDashboard,
];

/// The static permission table for a role. Admin is resolved through the
/// bypass in `has_permission`, so its slice is empty here.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &[],
        Role::Recruiter => RECRUITER_PERMISSIONS,
        Role::HiringManager => HIRING_MANAGER_PERMISSIONS,
        Role::Viewer => VIEWER_PERMISSIONS,
    }
}

pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    is_admin(role) || permissions_for(role).contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PERMISSIONS: &[Permission] = &[
        Permission::ViewClients,
        Permission::CreateClients,
        Permission::EditClients,
        Permission::DeleteClients,
        Permission::ViewJobs,
        Permission::CreateJobs,
        Permission::EditJobs,
        Permission::DeleteJobs,
        Permission::ViewCandidates,
        Permission::CreateCandidates,
        Permission::EditCandidates,
        Permission::DeleteCandidates,
        Permission::ViewApplications,
        Permission::CreateApplications,
        Permission::ReviewApplications,
        Permission::DeleteApplications,
        Permission::ViewInterviews,
        Permission::ScheduleInterviews,
        Permission::EditInterviews,
        Permission::ViewEmails,
        Permission::SendEmails,
        Permission::ManageEmailTemplates,
        Permission::ViewUsers,
        Permission::ManageUsers,
        Permission::ViewDashboard,
        Permission::ViewReports,
        Permission::RunConsistencyCheck,
    ];

    #[test]
    fn test_admin_has_every_permission() {
        for permission in ALL_PERMISSIONS {
            assert!(has_permission(Role::Admin, *permission));
        }
    }

    #[test]
    fn test_non_admin_roles_match_their_table_exactly() {
        for role in [Role::Recruiter, Role::HiringManager, Role::Viewer] {
            let table = permissions_for(role);
            for permission in ALL_PERMISSIONS {
                assert_eq!(
                    has_permission(role, *permission),
                    table.contains(permission),
                    "{role} / {permission:?}"
                );
            }
        }
    }

    #[test]
    fn test_viewer_cannot_mutate() {
        assert!(!has_permission(Role::Viewer, Permission::CreateJobs));
        assert!(!has_permission(Role::Viewer, Permission::EditCandidates));
        assert!(!has_permission(Role::Viewer, Permission::ManageUsers));
        assert!(has_permission(Role::Viewer, Permission::ViewJobs));
    }

    #[test]
    fn test_recruiter_cannot_manage_users_or_delete() {
        assert!(!has_permission(Role::Recruiter, Permission::ManageUsers));
        assert!(!has_permission(Role::Recruiter, Permission::DeleteClients));
        assert!(!has_permission(Role::Recruiter, Permission::RunConsistencyCheck));
        assert!(has_permission(Role::Recruiter, Permission::CreateJobs));
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(is_admin(Role::Admin));
        assert!(!is_admin(Role::Recruiter));
        assert!(!is_admin(Role::HiringManager));
        assert!(!is_admin(Role::Viewer));
    }

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [
            Role::Admin,
            Role::Recruiter,
            Role::HiringManager,
            Role::Viewer,
        ] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
        assert!(Role::from_str("superuser").is_err());
    }
}
