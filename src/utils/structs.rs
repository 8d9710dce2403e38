// orgdesk/src/utils/structs.rs
use serde::{Serialize, Deserialize};

use crate::ability::Grant;
use crate::gate::RowActions;
use crate::menu::MenuItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AbilityCheckQuery {
    pub action: String,
    pub subject: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbilityCheckResponse {
    pub action: String,
    pub subject: String,
    pub can: bool,
}

#[derive(Debug, Serialize)]
pub struct AbilitySummary {
    pub user_id: String,
    pub role_name: Option<String>,
    pub rules: Vec<Grant>,
    pub established_at: i64,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub role_name: Option<String>,
    pub menus: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub struct RowActionsResponse {
    pub subject: String,
    #[serde(flatten)]
    pub actions: RowActions,
}
