use crate::db::models::Settings;
use crate::db::operations::{get_settings, set_display_unit};
use crate::error::Result;
use crate::tracker::Tracker;
use crate::units::Unit;

impl Tracker {
    pub async fn settings(&self) -> Result<Settings> {
        get_settings(&self.db_pool).await
    }

    pub async fn display_unit(&self) -> Result<Unit> {
        self.settings().await?.unit()
    }

    pub async fn set_display_unit(&self, unit: Unit) -> Result<()> {
        set_display_unit(&self.db_pool, unit).await
    }
}
