//! Reconciliation of parent-owned child rows.
//!
//! A patch for a parent carries a list of child payloads. Payloads with an
//! identifier overwrite that child's value fields; payloads without one are
//! created under the parent. Children the patch does not mention are left
//! as they are: nothing is deleted by omission.
//!
//! Every step runs on the caller's [`DatabaseTransaction`], so the parent
//! write and all child writes commit or roll back together.
//!
//! ```ignore
//! let txn = db.begin().await?;
//! // ... update the parent row ...
//! let images = reconcile(&ImageStore, &txn, product_id, patch.images, policy).await?;
//! txn.commit().await?;
//! ```

use async_trait::async_trait;
use futures::future::try_join_all;
use sea_orm::{DatabaseTransaction, DbErr};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use strum::{Display, EnumString};
use tracing::{debug, warn};
use uuid::Uuid;

/// A payload that may name an already persisted row.
pub trait Identified {
    fn identifier(&self) -> Option<Uuid>;
}

/// Result of splitting a patch list by presence of an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned<T> {
    pub existing: Vec<(Uuid, T)>,
    pub new: Vec<T>,
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            existing: Vec::new(),
            new: Vec::new(),
        }
    }
}

/// Split `items` into updates and inserts in one pass.
///
/// Relative order is preserved inside each half.
pub fn partition<T, I>(items: I) -> Partitioned<T>
where
    T: Identified,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .fold(Partitioned::default(), |mut acc, item| {
            match item.identifier() {
                Some(id) => acc.existing.push((id, item)),
                None => acc.new.push(item),
            }
            acc
        })
}

/// Serde helper for optional child ids: `null`, a missing key and `""` all
/// mean "new child".
///
/// Use together with `#[serde(default)]`.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// What to do when an update names a child that does not exist under the
/// parent (unknown id, or an id owned by another parent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MissingChildPolicy {
    /// Abort the whole patch with [`ReconcileError::MissingChild`]
    #[default]
    Reject,
    /// Log and carry on; the update is a no-op
    Ignore,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("{kind} {id} not found for parent {parent_id}")]
    MissingChild {
        kind: &'static str,
        id: Uuid,
        parent_id: Uuid,
    },

    #[error("{kind} {id} appears more than once in one patch")]
    DuplicateChild { kind: &'static str, id: Uuid },
}

/// A patch may name each existing child at most once; with two entries for
/// one id the resulting row would depend on write order.
fn reject_duplicate_ids<T>(
    kind: &'static str,
    existing: &[(Uuid, T)],
) -> Result<(), ReconcileError> {
    let mut seen = HashSet::with_capacity(existing.len());
    match existing.iter().find(|(id, _)| !seen.insert(*id)) {
        Some((id, _)) => Err(ReconcileError::DuplicateChild { kind, id: *id }),
        None => Ok(()),
    }
}

/// Persistence for one kind of child row.
///
/// Implementations only touch rows whose foreign key equals `parent_id`;
/// neither the id nor the foreign key is ever rewritten.
#[async_trait]
pub trait ChildStore: Send + Sync {
    type Input: Identified + Send + Sync;
    type Output: Send;

    /// Human readable name used in errors and logs, e.g. `"product image"`
    const KIND: &'static str;

    /// Overwrite the value fields of child `id`. Returns the affected row count.
    async fn update_one(
        &self,
        txn: &DatabaseTransaction,
        parent_id: Uuid,
        id: Uuid,
        input: &Self::Input,
    ) -> Result<u64, DbErr>;

    /// Insert all `inputs` under `parent_id` in a single statement.
    ///
    /// Never called with an empty list.
    async fn insert_many(
        &self,
        txn: &DatabaseTransaction,
        parent_id: Uuid,
        inputs: Vec<Self::Input>,
    ) -> Result<(), DbErr>;

    /// Current children of `parent_id` in display order.
    async fn list_for_parent(
        &self,
        txn: &DatabaseTransaction,
        parent_id: Uuid,
    ) -> Result<Vec<Self::Output>, DbErr>;
}

/// Apply `input` to the children of `parent_id` and return the re-read set.
///
/// Updates for the existing half are issued concurrently; the new half goes
/// out as one bulk insert. The returned list comes from the database, not
/// from the input. An id named twice fails with
/// [`ReconcileError::DuplicateChild`] before anything is written.
pub async fn reconcile<S: ChildStore>(
    store: &S,
    txn: &DatabaseTransaction,
    parent_id: Uuid,
    input: Vec<S::Input>,
    policy: MissingChildPolicy,
) -> Result<Vec<S::Output>, ReconcileError> {
    let Partitioned { existing, new } = partition(input);
    reject_duplicate_ids(S::KIND, &existing)?;

    debug!(
        kind = S::KIND,
        %parent_id,
        updates = existing.len(),
        inserts = new.len(),
        "Reconciling children"
    );

    let affected = try_join_all(existing.iter().map(|(id, item)| async move {
        let rows = store.update_one(txn, parent_id, *id, item).await?;
        Ok::<_, DbErr>((*id, rows))
    }))
    .await?;

    for (id, _) in affected.into_iter().filter(|(_, rows)| *rows == 0) {
        match policy {
            MissingChildPolicy::Reject => {
                return Err(ReconcileError::MissingChild {
                    kind: S::KIND,
                    id,
                    parent_id,
                });
            }
            MissingChildPolicy::Ignore => {
                warn!(kind = S::KIND, %id, %parent_id, "Update matched no child row");
            }
        }
    }

    if !new.is_empty() {
        store.insert_many(txn, parent_id, new).await?;
    }

    Ok(store.list_for_parent(txn, parent_id).await?)
}

/// A child row held in memory by a non-Postgres repository.
pub trait OwnedChild: Sized {
    type Patch: Identified;

    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// Overwrite the value fields from `patch`; id and parent stay as they are.
    fn overwrite(&mut self, patch: Self::Patch);

    fn create(parent_id: Uuid, patch: Self::Patch) -> Self;
}

/// In-memory counterpart of [`reconcile`] over the children already owned
/// by `parent_id`.
///
/// Duplicate ids, and under [`MissingChildPolicy::Reject`] unknown ids, are
/// checked before anything is written, so a rejected patch leaves
/// `children` unchanged.
pub fn reconcile_in_memory<C: OwnedChild>(
    children: &mut Vec<C>,
    parent_id: Uuid,
    input: Vec<C::Patch>,
    policy: MissingChildPolicy,
) -> Result<(), ReconcileError> {
    let Partitioned { existing, new } = partition(input);
    reject_duplicate_ids(C::KIND, &existing)?;

    let missing = existing
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !children.iter().any(|c| c.id() == *id));

    for id in missing {
        match policy {
            MissingChildPolicy::Reject => {
                return Err(ReconcileError::MissingChild {
                    kind: C::KIND,
                    id,
                    parent_id,
                });
            }
            MissingChildPolicy::Ignore => {
                warn!(kind = C::KIND, %id, %parent_id, "Update matched no child row");
            }
        }
    }

    for (id, patch) in existing {
        if let Some(child) = children.iter_mut().find(|c| c.id() == id) {
            child.overwrite(patch);
        }
    }
    children.extend(new.into_iter().map(|patch| C::create(parent_id, patch)));

    Ok(())
}
