//! Error catalog of the tenant resolver module.
//!
//! Codes are part of the external contract.

use tenancy_errors::ErrDef;

macro_rules! err_def {
    ($name:ident, $status:expr, $title:expr, $code:literal) => {
        pub const $name: ErrDef = ErrDef {
            status: $status,
            title: $title,
            code: $code,
            type_url: concat!("https://errors.tenancy.dev/", $code),
        };
    };
}

err_def!(TENANT_HEADER_MISSING, 400, "Tenant Header Missing", "TENANT_HEADER_MISSING");
err_def!(TENANT_NOT_FOUND, 404, "Tenant Not Found", "TENANT_NOT_FOUND");
err_def!(CROSS_TENANT_ACCESS, 403, "Cross-Tenant Access", "CROSS_TENANT_ACCESS");
err_def!(
    TENANT_RESOLUTION_ERROR,
    500,
    "Tenant Resolution Error",
    "TENANT_RESOLUTION_ERROR"
);
err_def!(TENANT_SLUG_TAKEN, 409, "Slug Already Taken", "TENANT_SLUG_TAKEN");
err_def!(TENANT_SLUG_INVALID, 422, "Invalid Slug", "TENANT_SLUG_INVALID");
err_def!(TENANT_VALIDATION, 422, "Validation Failed", "TENANT_VALIDATION");
err_def!(TENANT_DIRECTORY_ERROR, 500, "Internal Error", "TENANT_DIRECTORY_ERROR");
err_def!(ADMIN_ACCESS_REQUIRED, 403, "Admin Access Required", "ADMIN_ACCESS_REQUIRED");

/// Every entry, for uniqueness checks.
pub const ALL: &[ErrDef] = &[
    TENANT_HEADER_MISSING,
    TENANT_NOT_FOUND,
    CROSS_TENANT_ACCESS,
    TENANT_RESOLUTION_ERROR,
    TENANT_SLUG_TAKEN,
    TENANT_SLUG_INVALID,
    TENANT_VALIDATION,
    TENANT_DIRECTORY_ERROR,
    ADMIN_ACCESS_REQUIRED,
];
