//! Purpose: Archive and unarchive records with a closed set of reasons.
//! Exports: `ArchiveReason`, `ArchiveRecord`.
//! Role: Batch archive actions on interfaces; instance helpers reload after each transition.
//! Invariants: A reason outside the closed set is rejected locally, before any request.
#![allow(clippy::result_large_err)]

use crate::core::capability::{Archivable, Listable, Readable};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArchiveReason {
    MadeInError,
    Retired,
    Expended,
    Shipped,
    Contaminated,
    Expired,
    Missing,
    #[default]
    Other,
}

impl ArchiveReason {
    pub const ALL: [ArchiveReason; 8] = [
        ArchiveReason::MadeInError,
        ArchiveReason::Retired,
        ArchiveReason::Expended,
        ArchiveReason::Shipped,
        ArchiveReason::Contaminated,
        ArchiveReason::Expired,
        ArchiveReason::Missing,
        ArchiveReason::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveReason::MadeInError => "Made in error",
            ArchiveReason::Retired => "Retired",
            ArchiveReason::Expended => "Expended",
            ArchiveReason::Shipped => "Shipped",
            ArchiveReason::Contaminated => "Contaminated",
            ArchiveReason::Expired => "Expired",
            ArchiveReason::Missing => "Missing",
            ArchiveReason::Other => "Other",
        }
    }
}

impl fmt::Display for ArchiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveReason {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_str() == value)
            .ok_or_else(|| {
                let allowed: Vec<_> = Self::ALL.iter().map(|reason| reason.as_str()).collect();
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown archive reason \"{value}\""))
                    .with_hint(format!("reason must be one of {allowed:?}"))
            })
    }
}

/// Server-side archive marker; present only while archived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveRecord {
    pub reason: Option<String>,
}

impl ArchiveRecord {
    pub fn reason(&self) -> Option<ArchiveReason> {
        self.reason.as_deref().and_then(|reason| reason.parse().ok())
    }
}

fn ids_body<T: Archivable>(ids: impl IntoIterator<Item = impl AsRef<str>>) -> Map<String, Value> {
    let ids: Vec<Value> = ids
        .into_iter()
        .map(|id| Value::String(id.as_ref().to_string()))
        .collect();
    let mut body = Map::new();
    body.insert(T::DESCRIPTOR.ids_key(), Value::Array(ids));
    body
}

impl<T: Archivable> Interface<T> {
    pub fn archive_many(
        &self,
        ids: impl IntoIterator<Item = impl AsRef<str>>,
        reason: ArchiveReason,
    ) -> ApiResult<Value> {
        let mut body = ids_body::<T>(ids);
        body.insert("reason".to_string(), Value::String(reason.as_str().to_string()));
        self.raw_post(&[], &Query::new(), &Value::Object(body), Some("archive"))
    }

    pub fn unarchive_many(&self, ids: impl IntoIterator<Item = impl AsRef<str>>) -> ApiResult<Value> {
        let body = ids_body::<T>(ids);
        self.raw_post(&[], &Query::new(), &Value::Object(body), Some("unarchive"))
    }
}

impl<T: Archivable + Listable> Interface<T> {
    /// First page of records archived for `reason`.
    pub fn list_archived(&self, reason: ArchiveReason, query: &Query) -> ApiResult<Vec<Model<T>>> {
        self.list(&query.clone().with("archive_reason", reason.as_str()))
    }
}

impl<T: Archivable> Model<T> {
    pub fn is_archived(&self) -> bool {
        self.data().archive_record().is_some()
    }

    pub fn archive_reason(&self) -> Option<ArchiveReason> {
        self.data().archive_record().and_then(ArchiveRecord::reason)
    }
}

impl<T: Archivable + Readable> Model<T> {
    pub fn archive(&mut self, reason: ArchiveReason) -> ApiResult<&mut Self> {
        let id = self.require_id("archive")?;
        self.interface().archive_many([id.as_str()], reason)?;
        self.reload()
    }

    pub fn unarchive(&mut self) -> ApiResult<&mut Self> {
        let id = self.require_id("unarchive")?;
        self.interface().unarchive_many([id.as_str()])?;
        self.reload()
    }
}
