#![allow(clippy::result_large_err)]

use crate::core::capability::Readable;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model};
use tracing::debug;

impl<T: Readable> Interface<T> {
    /// `None` when the server answers 404.
    pub fn get(&self, id: &str) -> ApiResult<Option<Model<T>>> {
        self.get_with(id, &Query::new())
    }

    pub fn get_with(&self, id: &str, query: &Query) -> ApiResult<Option<Model<T>>> {
        match self.raw_get(&[id], query, None) {
            Ok(value) => self.load(value).map(Some),
            Err(err) if err.is_not_found() => {
                debug!(model = T::DESCRIPTOR.name, id, "record not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn find(&self, id: &str) -> ApiResult<Option<Model<T>>> {
        self.get(id)
    }
}

impl<T: Readable> Model<T> {
    /// Re-fetch by id and merge the server copy into this instance.
    pub fn reload(&mut self) -> ApiResult<&mut Self> {
        let id = self.require_id("reload")?;
        let fresh = self.interface().get(&id)?.ok_or_else(|| {
            Error::new(ErrorKind::Api)
                .with_status(404)
                .with_message(format!("{} {id} no longer exists", T::DESCRIPTOR.name))
        })?;
        self.merge(fresh);
        Ok(self)
    }
}
