use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{decode_pages, TeamPermission};

/// 团队插件权限实体
///
/// 对应数据库表 ws_team_plugin_permissions，每行记录一个团队对某个插件的页面访问授权
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ws_team_plugin_permissions")]
pub struct Model {
    /// 自增主键
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 团队 ID
    pub team_id: i64,

    /// 插件 ID
    pub plugin_id: String,

    /// 最后修改时间（Unix 秒）
    pub last_modified: i64,

    /// 页面列表，以逗号分隔
    pub page_access: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为领域记录
    pub fn into_permission(self) -> TeamPermission {
        TeamPermission {
            id: self.id,
            team_id: self.team_id,
            plugin_id: self.plugin_id,
            page_access: decode_pages(&self.page_access),
            last_modified: chrono::DateTime::from_timestamp(self.last_modified, 0)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_permission() {
        let model = Model {
            id: 9,
            team_id: 4,
            plugin_id: "acme-app".to_string(),
            last_modified: 1_700_000_000,
            page_access: "Overview,Alarms".to_string(),
        };

        let permission = model.into_permission();
        assert_eq!(permission.id, 9);
        assert_eq!(permission.team_id, 4);
        assert_eq!(permission.page_access, vec!["Overview", "Alarms"]);
        assert_eq!(permission.last_modified.timestamp(), 1_700_000_000);
    }
}
