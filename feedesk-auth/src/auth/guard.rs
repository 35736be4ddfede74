//! Role-based route guard
//!
//! [`Operation::allowed_roles`] is the single capability table for the whole
//! application. Handlers name the operation they perform and call
//! [`authorize`]; nobody compares role strings inline.

use serde::Serialize;

use crate::error::AuthError;

use super::types::{PublicUser, Role};

/// Every protected operation in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Administration
    ManageUsers,
    ManageParents,
    ManageStudents,
    ViewAdminDashboard,

    // Students
    ViewStudents,
    UpdateStudent,

    // Fees
    ViewFeeTypes,
    ViewFeeVouchers,
    IssueFeeVouchers,
    RecordPayment,

    // Society (cashier) desk
    ViewPendingVouchers,
    MarkVouchersPaid,
    ViewDailyReport,
    ViewSocietyDashboard,

    // Dashboards
    ViewAccountantDashboard,
    ViewPrincipalDashboard,
    ViewParentDashboard,
    ViewOwnFees,

    ViewProfile,
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::ManageUsers,
        Operation::ManageParents,
        Operation::ManageStudents,
        Operation::ViewAdminDashboard,
        Operation::ViewStudents,
        Operation::UpdateStudent,
        Operation::ViewFeeTypes,
        Operation::ViewFeeVouchers,
        Operation::IssueFeeVouchers,
        Operation::RecordPayment,
        Operation::ViewPendingVouchers,
        Operation::MarkVouchersPaid,
        Operation::ViewDailyReport,
        Operation::ViewSocietyDashboard,
        Operation::ViewAccountantDashboard,
        Operation::ViewPrincipalDashboard,
        Operation::ViewParentDashboard,
        Operation::ViewOwnFees,
        Operation::ViewProfile,
    ];

    /// Roles permitted to perform this operation
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            Self::ManageUsers | Self::ManageParents | Self::ManageStudents | Self::ViewAdminDashboard => &[Admin],
            Self::UpdateStudent => &[Accountant],
            // read-only listings open to any signed-in account
            Self::ViewStudents | Self::ViewFeeTypes | Self::ViewFeeVouchers => &Role::ALL,
            Self::IssueFeeVouchers => &[Admin, Accountant],
            Self::RecordPayment => &[Admin, Accountant, SocietyMember],
            Self::ViewPendingVouchers
            | Self::MarkVouchersPaid
            | Self::ViewDailyReport
            | Self::ViewSocietyDashboard => &[Admin, SocietyMember],
            Self::ViewAccountantDashboard => &[Admin, Accountant],
            Self::ViewPrincipalDashboard => &[Admin, Principal],
            Self::ViewParentDashboard | Self::ViewOwnFees => &[Parent],
            Self::ViewProfile => &Role::ALL,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ManageParents => "manage_parents",
            Self::ManageStudents => "manage_students",
            Self::ViewAdminDashboard => "view_admin_dashboard",
            Self::ViewStudents => "view_students",
            Self::UpdateStudent => "update_student",
            Self::ViewFeeTypes => "view_fee_types",
            Self::ViewFeeVouchers => "view_fee_vouchers",
            Self::IssueFeeVouchers => "issue_fee_vouchers",
            Self::RecordPayment => "record_payment",
            Self::ViewPendingVouchers => "view_pending_vouchers",
            Self::MarkVouchersPaid => "mark_vouchers_paid",
            Self::ViewDailyReport => "view_daily_report",
            Self::ViewSocietyDashboard => "view_society_dashboard",
            Self::ViewAccountantDashboard => "view_accountant_dashboard",
            Self::ViewPrincipalDashboard => "view_principal_dashboard",
            Self::ViewParentDashboard => "view_parent_dashboard",
            Self::ViewOwnFees => "view_own_fees",
            Self::ViewProfile => "view_profile",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No valid session
    Unauthenticated,
    /// Valid session, role not in the allow-list
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `user` may perform `operation`
pub fn authorize(user: Option<&PublicUser>, operation: Operation) -> Decision {
    match user {
        None => Decision::Deny(DenyReason::Unauthenticated),
        Some(u) if operation.permits(u.role) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::Forbidden),
    }
}

/// [`authorize`], as a `Result` carrying the user through on success
pub fn require(user: Option<PublicUser>, operation: Operation) -> Result<PublicUser, AuthError> {
    match (authorize(user.as_ref(), operation), user) {
        (Decision::Allow, Some(u)) => Ok(u),
        (_, None) => Err(AuthError::Unauthenticated),
        (_, Some(u)) => Err(AuthError::Forbidden {
            operation: operation.to_string(),
            role: u.role.to_string(),
        }),
    }
}
