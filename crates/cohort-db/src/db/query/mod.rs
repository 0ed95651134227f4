pub mod group;
pub mod membership;
pub mod platform_user;
pub mod text;
