// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware puts an AuthUser in the request extensions.
// Each handler checks the permission it needs and scopes store calls to the
// caller's id.
pub mod auth;
pub mod whiskeys;
