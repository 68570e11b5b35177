use crate::db::models::Machine;
use crate::db::operations::{
    create_machine, delete_machine, get_all_machines, get_machine, update_machine,
};
use crate::error::Result;
use crate::tracker::Tracker;

impl Tracker {
    pub async fn add_machine(
        &self,
        label: &str,
        muscle_group: Option<String>,
        image: Option<Vec<u8>>,
        thumbnail: Option<Vec<u8>>,
    ) -> Result<Machine> {
        create_machine(&self.db_pool, label, muscle_group, image, thumbnail).await
    }

    pub async fn get_machine(&self, machine_id: i64) -> Result<Option<Machine>> {
        get_machine(&self.db_pool, machine_id).await
    }

    pub async fn list_machines(&self) -> Result<Vec<Machine>> {
        get_all_machines(&self.db_pool).await
    }

    pub async fn update_machine(
        &self,
        machine_id: i64,
        label: &str,
        muscle_group: Option<String>,
        image: Option<Vec<u8>>,
        thumbnail: Option<Vec<u8>>,
    ) -> Result<Machine> {
        update_machine(&self.db_pool, machine_id, label, muscle_group, image, thumbnail).await
    }

    /// Delete a machine and, through the cascading foreign key, every set
    /// logged against it.
    pub async fn delete_machine(&self, machine_id: i64) -> Result<u64> {
        delete_machine(&self.db_pool, machine_id).await
    }
}
