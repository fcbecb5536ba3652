//! Purpose: Name-addressed resource access returning local-form JSON records.
//! Exports: `DynInterface`.
//! Role: One per registered type on every `Session`; backs `Session::interface(name)`.
//! Invariants: Operations outside the descriptor's capability set fail with `Usage` and send nothing.
#![allow(clippy::result_large_err)]

use crate::core::capability::{Items, Paged};
use crate::core::codec;
use crate::core::error::ApiResult;
use crate::core::http::{Http, Query};
use crate::core::model::page_items;
use crate::core::registry::{Capability, ResourceDescriptor};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct DynInterface {
    http: Http,
    descriptor: &'static ResourceDescriptor,
}

impl DynInterface {
    pub(crate) fn new(http: Http, descriptor: &'static ResourceDescriptor) -> Self {
        Self { http, descriptor }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn model_name(&self) -> &'static str {
        self.descriptor.name
    }

    /// `None` when the server answers 404.
    pub fn get(&self, id: &str) -> ApiResult<Option<Value>> {
        self.descriptor.require(Capability::Read)?;
        let path = format!("{}/{id}", self.descriptor.path());
        match self.http.get(&path, &Query::new(), None) {
            Ok(value) => Ok(Some(codec::to_local(&value))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn list(&self, query: &Query) -> ApiResult<Vec<Value>> {
        self.descriptor.require(Capability::List)?;
        let page = self.http.get(&self.descriptor.path(), query, None)?;
        decode_page(page, &self.descriptor.collection_key())
    }

    pub fn all(
        &self,
        page_limit: Option<usize>,
        limit: Option<usize>,
        query: Query,
    ) -> ApiResult<Items<Value>> {
        self.descriptor.require(Capability::List)?;
        let key = self.descriptor.collection_key();
        let pages = self.http.pages(&self.descriptor.path(), query, None);
        let paged = Paged::new(pages, page_limit, Box::new(move |page| decode_page(page, &key)));
        Ok(Items::new(paged, limit))
    }
}

fn decode_page(page: Value, key: &str) -> ApiResult<Vec<Value>> {
    Ok(page_items(page, key)?
        .iter()
        .map(codec::to_local)
        .collect())
}
