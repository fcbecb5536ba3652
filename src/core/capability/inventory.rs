#![allow(clippy::result_large_err)]

use crate::core::capability::Inventory;
use crate::core::error::ApiResult;
use crate::core::model::Model;

impl<T: Inventory> Model<T> {
    /// Re-file the record under `folder_id` and persist it.
    pub fn move_to(&mut self, folder_id: &str) -> ApiResult<&mut Self> {
        self.set_folder_id(Some(folder_id.to_string()));
        self.update()
    }
}
