#![allow(clippy::result_large_err)]

use crate::core::capability::{Creatable, Listable, Updatable};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model};
use serde_json::Value;
use tracing::debug;

impl<T: Updatable> Interface<T> {
    /// Local-form update body: the descriptor's update fields, nulls dropped.
    pub fn update_body(&self, data: &T) -> ApiResult<Value> {
        self.dump_fields(data, T::DESCRIPTOR.update_fields)
    }

    pub fn update_model(&self, id: &str, data: &T) -> ApiResult<Model<T>> {
        let body = self.update_body(data)?;
        let response = self.raw_patch(&[id], &Query::new(), &body, None)?;
        self.load(response)
    }
}

impl<T: Updatable> Model<T> {
    /// Patch the server copy; the response wins field by field.
    pub fn update(&mut self) -> ApiResult<&mut Self> {
        let id = self.require_id("update")?;
        let server = self.interface().update_model(&id, self.data())?;
        self.merge(server);
        Ok(self)
    }
}

impl<T: Creatable + Updatable + Listable> Interface<T> {
    /// Create `model`, or update the single server record agreeing with it on `on_fields`.
    ///
    /// More than one match is rejected before anything is written.
    pub fn merge(&self, model: &mut Model<T>, on_fields: &[&str]) -> ApiResult<()> {
        let local = self.dump(model.data())?;
        let mut query = Query::new();
        for field in on_fields {
            let value = local.get(*field).cloned().ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("merge field \"{field}\" has no value"))
            })?;
            query.set(*field, value);
        }

        // Walk every page; a second match anywhere already decides the outcome.
        let mut matches = Vec::new();
        for candidate in self.all(None, None, query) {
            let candidate = candidate?;
            let remote = self.dump(candidate.data())?;
            if on_fields.iter().all(|field| remote.get(*field) == local.get(*field)) {
                matches.push(candidate);
                if matches.len() > 1 {
                    break;
                }
            }
        }

        match matches.as_slice() {
            [] => {
                debug!(model = T::DESCRIPTOR.name, "merge found no match, creating");
                model.save()?;
            }
            [existing] => {
                let id = existing.require_id("merge")?;
                debug!(model = T::DESCRIPTOR.name, id = %id, "merge adopting existing record");
                let server = self.update_model(&id, model.data())?;
                model.merge(server);
            }
            many => {
                return Err(Error::new(ErrorKind::Usage).with_message(format!(
                    "merge is ambiguous: {} {} records match on {:?}",
                    many.len(),
                    T::DESCRIPTOR.name,
                    on_fields
                )));
            }
        }
        Ok(())
    }
}
