#![allow(clippy::result_large_err)]

use crate::core::capability::Creatable;
use crate::core::error::ApiResult;
use crate::core::http::Query;
use crate::core::model::{Interface, Model};
use serde_json::{Map, Value};
use tracing::debug;

const BULK_CREATE: &str = "bulk-create";

impl<T: Creatable> Interface<T> {
    /// Local-form create body: the descriptor's create fields, nulls dropped.
    pub fn create_body(&self, data: &T) -> ApiResult<Value> {
        self.dump_fields(data, T::DESCRIPTOR.create_fields)
    }

    pub fn create_model(&self, data: &T) -> ApiResult<Model<T>> {
        let body = self.create_body(data)?;
        let response = self.raw_post(&[], &Query::new(), &body, None)?;
        self.load(response)
    }

    /// One `bulk-create` call; the response may be a bare array or the keyed collection.
    pub fn bulk_create(&self, records: &[T]) -> ApiResult<Vec<Model<T>>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let items = records
            .iter()
            .map(|record| self.create_body(record))
            .collect::<ApiResult<Vec<_>>>()?;
        let mut body = Map::new();
        body.insert(T::DESCRIPTOR.collection_key(), Value::Array(items));
        debug!(model = T::DESCRIPTOR.name, count = records.len(), "bulk create");
        let response = self.raw_post(&[], &Query::new(), &Value::Object(body), Some(BULK_CREATE))?;
        self.load_page(response)
    }
}

impl<T: Creatable> Model<T> {
    /// Create on the server and merge the response into this instance.
    pub fn save(&mut self) -> ApiResult<&mut Self> {
        let server = self.interface().create_model(self.data())?;
        self.merge(server);
        Ok(self)
    }
}
