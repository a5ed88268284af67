//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod notes;
pub mod refresh_tokens;
pub mod roles;
pub mod user_roles;
pub mod users;

pub use notes::Entity as Notes;
pub use refresh_tokens::Entity as RefreshTokens;
pub use roles::Entity as Roles;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
