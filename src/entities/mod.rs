//! SeaORM 实体模块
//!
//! 此模块包含团队插件权限表的 SeaORM 实体定义

pub mod team_plugin_permission;

/// Prelude 模块，重新导出常用的 SeaORM 实体和类型
pub mod prelude {
    pub use super::team_plugin_permission::Column as TeamPluginPermissionColumn;
    pub use super::team_plugin_permission::Entity as TeamPluginPermission;
}

pub use team_plugin_permission::ActiveModel as TeamPluginPermissionActiveModel;
