//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page declares its access requirement through `RouteGuard` and
//! delegates shared chrome to `components`.

pub mod admin;
pub mod home;
pub mod login;
pub mod profile;
pub mod signup;
