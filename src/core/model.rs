//! Purpose: Resource base contract, session-bound interfaces, and loaded instances.
//! Exports: `Resource`, `Interface`, `Model`, `StagedSchema`.
//! Role: Glue between descriptors, the codec, serde, and the transport.
//! Invariants: Loading always runs wire -> local codec before serde decoding.
//! Invariants: Writes only carry the descriptor's field subset, nulls dropped.
//! Invariants: Server responses merge through `Resource::apply_server`, never by raw injection.
#![allow(clippy::result_large_err)]

use crate::core::codec;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::{Pages, Query};
use crate::core::registry::ResourceDescriptor;
use crate::core::session::Session;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const DESCRIPTOR: &'static ResourceDescriptor;

    fn id(&self) -> Option<&str>;

    fn name(&self) -> Option<&str> {
        None
    }

    /// Take the server copy; the response is authoritative for every field it carries.
    fn apply_server(&mut self, server: Self) {
        *self = server;
    }

    /// Forget server-assigned state so the record can be created anew.
    fn clear_server_fields(&mut self);
}

/// A resource type bound to one session.
pub struct Interface<T: Resource> {
    session: Session,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for Interface<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> fmt::Debug for Interface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("model", &T::DESCRIPTOR.name)
            .field("home", &self.session.url())
            .finish()
    }
}

impl<T: Resource> Interface<T> {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            _marker: PhantomData,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        T::DESCRIPTOR
    }

    pub fn model_name(&self) -> &'static str {
        T::DESCRIPTOR.name
    }

    pub fn path(&self) -> String {
        T::DESCRIPTOR.path()
    }

    fn resource_path(&self, sub_path: &[&str]) -> String {
        let mut path = self.path();
        for segment in sub_path {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    pub fn raw_get(&self, sub_path: &[&str], query: &Query, action: Option<&str>) -> ApiResult<Value> {
        self.session
            .http()
            .get(&self.resource_path(sub_path), query, action)
    }

    pub fn raw_post(
        &self,
        sub_path: &[&str],
        query: &Query,
        body: &Value,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        self.session
            .http()
            .post(&self.resource_path(sub_path), query, body, action)
    }

    pub fn raw_patch(
        &self,
        sub_path: &[&str],
        query: &Query,
        body: &Value,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        self.session
            .http()
            .patch(&self.resource_path(sub_path), query, body, action)
    }

    pub fn raw_delete(
        &self,
        sub_path: &[&str],
        query: &Query,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        self.session
            .http()
            .delete(&self.resource_path(sub_path), query, action)
    }

    pub fn raw_pages(&self, sub_path: &[&str], query: Query, action: Option<&str>) -> Pages {
        self.session
            .http()
            .pages(&self.resource_path(sub_path), query, action)
    }

    /// Wrap locally-built data as an unsaved instance of this session.
    pub fn build(&self, data: T) -> Model<T> {
        Model {
            interface: self.clone(),
            data,
            raw: None,
            staged: None,
        }
    }

    pub fn load(&self, value: Value) -> ApiResult<Model<T>> {
        let local = codec::to_local(&value);
        let data: T = serde_json::from_value(local).map_err(|err| {
            Error::new(ErrorKind::Deserialize)
                .with_message(format!("failed to load {}", T::DESCRIPTOR.name))
                .with_source(err)
        })?;
        Ok(Model {
            interface: self.clone(),
            data,
            raw: Some(value),
            staged: None,
        })
    }

    pub fn load_many(&self, values: Vec<Value>) -> ApiResult<Vec<Model<T>>> {
        values.into_iter().map(|value| self.load(value)).collect()
    }

    /// Load the records of one list page (`{"dnaSequences": [...], "nextToken": ..}`).
    pub fn load_page(&self, page: Value) -> ApiResult<Vec<Model<T>>> {
        let items = page_items(page, &T::DESCRIPTOR.collection_key())?;
        self.load_many(items)
    }

    /// Every non-null top-level field, in local form.
    pub fn dump(&self, data: &T) -> ApiResult<Value> {
        let map = dump_map(data)?;
        Ok(Value::Object(
            map.into_iter().filter(|(_, value)| !value.is_null()).collect(),
        ))
    }

    /// Only the named top-level fields, nulls dropped, in local form.
    pub fn dump_fields(&self, data: &T, fields: &[&str]) -> ApiResult<Value> {
        let map = dump_map(data)?;
        Ok(Value::Object(
            map.into_iter()
                .filter(|(key, value)| !value.is_null() && fields.contains(&key.as_str()))
                .collect(),
        ))
    }
}

fn dump_map<T: Serialize>(data: &T) -> ApiResult<Map<String, Value>> {
    match serde_json::to_value(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::new(ErrorKind::Internal).with_message("resource did not serialize to an object")),
        Err(err) => Err(Error::new(ErrorKind::Internal)
            .with_message("failed to serialize resource")
            .with_source(err)),
    }
}

/// Pull the local-keyed record array out of a raw page.
pub(crate) fn page_items(page: Value, local_key: &str) -> ApiResult<Vec<Value>> {
    let wire_key = codec::wire_key(local_key);
    match page {
        Value::Object(mut map) => match map.remove(&wire_key) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Err(Error::new(ErrorKind::Deserialize)
                .with_message(format!("list response is missing \"{wire_key}\""))),
            Some(_) => Err(Error::new(ErrorKind::Deserialize)
                .with_message(format!("list response \"{wire_key}\" is not an array"))),
        },
        Value::Array(items) => Ok(items),
        _ => Err(Error::new(ErrorKind::Deserialize).with_message("list response is not an object")),
    }
}

/// Registry/schema selection staged locally, awaiting `register`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedSchema {
    pub registry_id: String,
    pub schema_id: String,
}

/// One loaded or locally-built record plus its session binding.
pub struct Model<T: Resource> {
    interface: Interface<T>,
    data: T,
    raw: Option<Value>,
    pub(crate) staged: Option<StagedSchema>,
}

impl<T: Resource> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
            data: self.data.clone(),
            raw: self.raw.clone(),
            staged: self.staged.clone(),
        }
    }
}

impl<T: Resource> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(T::DESCRIPTOR.name)
            .field("data", &self.data)
            .field("staged", &self.staged)
            .finish()
    }
}

impl<T: Resource + PartialEq> PartialEq for Model<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.staged == other.staged && self.raw == other.raw
    }
}

impl<T: Resource> Deref for Model<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Resource> DerefMut for Model<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<T: Resource> Model<T> {
    pub fn interface(&self) -> &Interface<T> {
        &self.interface
    }

    pub fn session(&self) -> &Session {
        self.interface.session()
    }

    pub fn model_name(&self) -> &'static str {
        T::DESCRIPTOR.name
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    /// Wire payload this instance was last loaded from.
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.data.id()
    }

    pub fn dump(&self) -> ApiResult<Value> {
        self.interface.dump(&self.data)
    }

    /// Unsaved copy carrying the same editable fields.
    pub fn duplicate(&self) -> Self {
        let mut data = self.data.clone();
        data.clear_server_fields();
        self.interface.build(data)
    }

    pub(crate) fn merge(&mut self, server: Model<T>) {
        self.data.apply_server(server.data);
        self.raw = server.raw;
    }

    pub(crate) fn require_id(&self, operation: &str) -> ApiResult<String> {
        self.id().map(str::to_string).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "cannot {operation} a {} that has not been saved",
                    T::DESCRIPTOR.name
                ))
                .with_hint("call save() first")
        })
    }
}
