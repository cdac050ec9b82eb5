//! Aggregation engine: folds typed fragments into consolidated documents.
//!
//! All record kinds share one generic two-level keyed merge. A kind
//! describes itself through the [`Consolidate`] trait (key extraction per
//! level plus entry/item/parcel access) and the [`Aggregator`] runs the
//! same algorithm for every kind:
//!
//! 1. Look up the document by primary key; absent means a new document is
//!    appended (first-seen order is the output order, never re-sorted).
//! 2. Within the document, look up the entry by entry key; absent means
//!    the fragment's entry is appended whole.
//! 3. Within an existing entry, merge items under the kind's item policy
//!    and parcels by parcel id. Identical repeats are tolerated
//!    (idempotent replay); same key with different content is a fatal
//!    [`ConflictError`].
//!
//! The engine is owned by exactly one caller at a time; merging is not
//! safe under concurrent mutation of the same document.

use std::collections::hash_map::Entry as IndexSlot;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::{conflict_payload, ConflictError, DecodeResult, MergeResult};
use crate::parser::RawRow;

pub mod kinds;

pub use kinds::{DeliveriesKind, ReturnInfoKind};

// =============================================================================
// Consolidation Trait
// =============================================================================

/// A record kind that consolidates row fragments into keyed documents.
///
/// The four key extractors (primary, entry, item, parcel) parameterize the
/// generic merge in [`Aggregator`]; a kind without a parcel concept keeps
/// the default no-op parcel hooks.
pub trait Consolidate {
    /// One row's typed contribution, produced by the decoder.
    type Fragment;
    /// The accumulating output unit.
    type Document: Serialize;
    /// Nested grouping inside a document, unique per entry key.
    type Entry;
    /// Innermost repeatable unit inside an entry.
    type Item: PartialEq + Serialize;
    /// Side structure attached to an entry, immutable once seen.
    type Parcel;

    /// Name used for this kind's entries in conflict messages.
    const ENTRY_LABEL: &'static str;

    /// Decode a raw row into this kind's fragment.
    fn decode(row: &RawRow) -> DecodeResult<Self::Fragment>;

    /// Key under which fragments consolidate into one document.
    fn primary_key(fragment: &Self::Fragment) -> &str;

    /// Seed a fresh document from the first fragment with a new key.
    fn new_document(fragment: Self::Fragment) -> Self::Document;

    /// Reduce a fragment to its entry once the target document exists.
    fn into_entry(fragment: Self::Fragment) -> Self::Entry;

    fn entries_mut(document: &mut Self::Document) -> &mut Vec<Self::Entry>;

    fn entry_key(entry: &Self::Entry) -> &str;

    fn items_mut(entry: &mut Self::Entry) -> &mut Vec<Self::Item>;

    /// Merge identity of an item within its entry. `None` means items
    /// carry no merge key and are appended unconditionally.
    fn item_key(item: &Self::Item) -> Option<&str>;

    /// Detach the parcels from a freshly decoded entry.
    fn take_parcels(_entry: &mut Self::Entry) -> Vec<Self::Parcel> {
        Vec::new()
    }

    /// Merge parcels into an existing entry.
    fn merge_parcels(
        _entry: &mut Self::Entry,
        _incoming: Vec<Self::Parcel>,
        _entry_key: &str,
    ) -> MergeResult<()> {
        Ok(())
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Ordered collection of consolidated documents with a primary-key index.
///
/// Documents keep the order their keys were first seen; `ingest` mutates
/// state in place and fails fast on contradictory duplicate data.
pub struct Aggregator<C: Consolidate> {
    documents: Vec<C::Document>,
    index: HashMap<String, usize>,
}

impl<C: Consolidate> Aggregator<C> {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Fold one fragment into the document set.
    pub fn ingest(&mut self, fragment: C::Fragment) -> MergeResult<()> {
        let key = C::primary_key(&fragment).to_owned();
        match self.index.entry(key) {
            IndexSlot::Occupied(slot) => {
                let document = &mut self.documents[*slot.get()];
                Self::merge_fragment(document, fragment)
            }
            IndexSlot::Vacant(slot) => {
                slot.insert(self.documents.len());
                self.documents.push(C::new_document(fragment));
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Finalize: hand the documents over in first-seen order.
    pub fn into_documents(self) -> Vec<C::Document> {
        self.documents
    }

    fn merge_fragment(document: &mut C::Document, fragment: C::Fragment) -> MergeResult<()> {
        let mut incoming = C::into_entry(fragment);
        let entry_key = C::entry_key(&incoming).to_owned();
        let entries = C::entries_mut(document);

        let Some(position) = entries
            .iter()
            .position(|entry| C::entry_key(entry) == entry_key)
        else {
            entries.push(incoming);
            return Ok(());
        };

        let parcels = C::take_parcels(&mut incoming);
        let items: Vec<C::Item> = C::items_mut(&mut incoming).drain(..).collect();

        let existing = &mut entries[position];
        for item in items {
            Self::merge_item(existing, item, &entry_key)?;
        }
        C::merge_parcels(existing, parcels, &entry_key)
    }

    fn merge_item(entry: &mut C::Entry, item: C::Item, entry_key: &str) -> MergeResult<()> {
        let items = C::items_mut(entry);

        let Some(item_key) = C::item_key(&item).map(str::to_owned) else {
            // No merge identity for this kind; append unconditionally
            items.push(item);
            return Ok(());
        };

        match items
            .iter()
            .position(|existing| C::item_key(existing) == Some(item_key.as_str()))
        {
            None => {
                items.push(item);
                Ok(())
            }
            // Identical repeat: idempotent replay, nothing to do
            Some(position) if items[position] == item => Ok(()),
            Some(position) => Err(ConflictError::Item {
                entry_label: C::ENTRY_LABEL,
                entry_key: entry_key.to_owned(),
                item_key,
                original: conflict_payload(&items[position]),
                incoming: conflict_payload(&item),
            }),
        }
    }
}

impl<C: Consolidate> Default for Aggregator<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge one keyed parcel into a parcel list, requiring field-for-field
/// equality for repeated keys. Shared by kinds with a parcel concept.
pub(crate) fn merge_keyed_parcel<P, K>(
    parcels: &mut Vec<P>,
    incoming: P,
    key_of: K,
    entry_label: &'static str,
    entry_key: &str,
) -> MergeResult<()>
where
    P: PartialEq + Serialize,
    K: Fn(&P) -> &str,
{
    match parcels
        .iter()
        .position(|parcel| key_of(parcel) == key_of(&incoming))
    {
        None => {
            parcels.push(incoming);
            Ok(())
        }
        // Same parcel replayed unchanged
        Some(position) if parcels[position] == incoming => Ok(()),
        Some(position) => Err(ConflictError::Parcel {
            entry_label,
            entry_key: entry_key.to_owned(),
            parcel_key: key_of(&incoming).to_owned(),
            original: conflict_payload(&parcels[position]),
            incoming: conflict_payload(&incoming),
        }),
    }
}
