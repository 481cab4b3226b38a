// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Route Prefix: /api/admin/*
// Same JWT middleware as the protected tier; each handler must obtain an
// AdminScope from the caller before touching cross-owner data.
pub mod users;
pub mod whiskeys;

pub use users::delete as admin_user_delete;
pub use users::list as admin_users_list;
pub use users::put as admin_user_put;
pub use users::put_role as admin_user_role_put;
pub use whiskeys::list as admin_whiskeys_list;
