// handlers/elevated/mod.rs - Administrator-only handlers
//
// Mounted under /api/admin behind the session middleware and the admin role
// check: role assignment for pending profiles and company management.
pub mod companies;
pub mod profiles;
