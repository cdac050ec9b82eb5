//! [`Consolidate`] implementations for the record kinds that merge
//! across rows.
//!
//! Return info merges one level (order entry items are appended without a
//! merge key, matching the destination API's behavior); deliveries merge
//! two levels (items by `_itemGroupId`, parcels by parcel id). Line-item
//! state never merges and has no implementation here.

use crate::decoder;
use crate::engine::{merge_keyed_parcel, Consolidate};
use crate::error::{DecodeResult, MergeResult};
use crate::models::{
    Delivery, DeliveryFragment, DeliveryItem, DeliveryOrder, Parcel, ReturnInfoEntry,
    ReturnInfoFragment, ReturnItem, ReturnOrder, ShippingInfo,
};
use crate::parser::RawRow;

// =============================================================================
// Return Info
// =============================================================================

/// Consolidation of return-info rows into one document per order.
pub struct ReturnInfoKind;

impl Consolidate for ReturnInfoKind {
    type Fragment = ReturnInfoFragment;
    type Document = ReturnOrder;
    type Entry = ReturnInfoEntry;
    type Item = ReturnItem;
    // Return info has no parcel concept; the default hooks are no-ops
    type Parcel = ();

    const ENTRY_LABEL: &'static str = "return info";

    fn decode(row: &RawRow) -> DecodeResult<Self::Fragment> {
        decoder::return_info(row)
    }

    fn primary_key(fragment: &Self::Fragment) -> &str {
        &fragment.order_number
    }

    fn new_document(fragment: Self::Fragment) -> Self::Document {
        ReturnOrder {
            order_number: fragment.order_number,
            return_info: vec![fragment.entry],
        }
    }

    fn into_entry(fragment: Self::Fragment) -> Self::Entry {
        fragment.entry
    }

    fn entries_mut(document: &mut Self::Document) -> &mut Vec<Self::Entry> {
        &mut document.return_info
    }

    fn entry_key(entry: &Self::Entry) -> &str {
        &entry.return_id
    }

    fn items_mut(entry: &mut Self::Entry) -> &mut Vec<Self::Item> {
        &mut entry.items
    }

    fn item_key(_item: &Self::Item) -> Option<&str> {
        // Return items have no natural merge key; appended unconditionally
        None
    }
}

// =============================================================================
// Deliveries
// =============================================================================

/// Consolidation of delivery rows into one document per order, with
/// deliveries merged by id and parcels immutable once seen.
pub struct DeliveriesKind;

impl Consolidate for DeliveriesKind {
    type Fragment = DeliveryFragment;
    type Document = DeliveryOrder;
    type Entry = Delivery;
    type Item = DeliveryItem;
    type Parcel = Parcel;

    const ENTRY_LABEL: &'static str = "delivery";

    fn decode(row: &RawRow) -> DecodeResult<Self::Fragment> {
        decoder::delivery(row)
    }

    fn primary_key(fragment: &Self::Fragment) -> &str {
        &fragment.order_number
    }

    fn new_document(fragment: Self::Fragment) -> Self::Document {
        DeliveryOrder {
            order_number: fragment.order_number,
            shipping_info: ShippingInfo {
                deliveries: vec![fragment.delivery],
            },
        }
    }

    fn into_entry(fragment: Self::Fragment) -> Self::Entry {
        fragment.delivery
    }

    fn entries_mut(document: &mut Self::Document) -> &mut Vec<Self::Entry> {
        &mut document.shipping_info.deliveries
    }

    fn entry_key(entry: &Self::Entry) -> &str {
        &entry.id
    }

    fn items_mut(entry: &mut Self::Entry) -> &mut Vec<Self::Item> {
        &mut entry.items
    }

    fn item_key(item: &Self::Item) -> Option<&str> {
        Some(&item.group_id)
    }

    fn take_parcels(entry: &mut Self::Entry) -> Vec<Self::Parcel> {
        entry.parcels.take().unwrap_or_default()
    }

    fn merge_parcels(
        entry: &mut Self::Entry,
        incoming: Vec<Self::Parcel>,
        entry_key: &str,
    ) -> MergeResult<()> {
        if incoming.is_empty() {
            return Ok(());
        }
        let parcels = entry.parcels.get_or_insert_with(Vec::new);
        for parcel in incoming {
            merge_keyed_parcel(parcels, parcel, |p| &p.id, Self::ENTRY_LABEL, entry_key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Aggregator;
    use crate::error::ConflictError;
    use crate::models::TrackingData;

    fn return_fragment(order: &str, return_id: &str, line_item: &str) -> ReturnInfoFragment {
        ReturnInfoFragment {
            order_number: order.to_string(),
            entry: ReturnInfoEntry {
                return_id: return_id.to_string(),
                return_tracking_id: None,
                return_date: None,
                items: vec![ReturnItem {
                    quantity: 1,
                    line_item_id: line_item.to_string(),
                    comment: None,
                    shipment_state: "shipped".to_string(),
                }],
            },
        }
    }

    fn delivery_fragment(order: &str, delivery_id: &str, group: &str) -> DeliveryFragment {
        DeliveryFragment {
            order_number: order.to_string(),
            delivery: Delivery {
                id: delivery_id.to_string(),
                items: vec![DeliveryItem {
                    group_id: group.to_string(),
                    id: format!("sku-{group}"),
                    quantity: 1,
                }],
                parcels: None,
            },
        }
    }

    fn with_parcel(mut fragment: DeliveryFragment, parcel_id: &str, carrier: &str) -> DeliveryFragment {
        fragment.delivery.parcels = Some(vec![Parcel {
            id: parcel_id.to_string(),
            measurements: None,
            tracking_data: Some(TrackingData {
                tracking_id: Some("123456789".to_string()),
                provider: None,
                provider_transaction: None,
                carrier: Some(carrier.to_string()),
                is_return: false,
            }),
        }]);
        fragment
    }

    #[test]
    fn test_return_info_groups_by_order_and_return_id() {
        let mut aggregator = Aggregator::<ReturnInfoKind>::new();
        aggregator.ingest(return_fragment("123", "1", "X")).unwrap();
        aggregator.ingest(return_fragment("123", "1", "Y")).unwrap();
        aggregator.ingest(return_fragment("123", "2", "Z")).unwrap();

        let documents = aggregator.into_documents();
        assert_eq!(documents.len(), 1);

        let order = &documents[0];
        assert_eq!(order.order_number, "123");
        assert_eq!(order.return_info.len(), 2);
        assert_eq!(order.return_info[0].items.len(), 2);
        assert_eq!(order.return_info[0].items[0].line_item_id, "X");
        assert_eq!(order.return_info[0].items[1].line_item_id, "Y");
        assert_eq!(order.return_info[1].items.len(), 1);
        assert_eq!(order.return_info[1].items[0].line_item_id, "Z");
    }

    #[test]
    fn test_return_items_append_without_merge_key() {
        // Replaying the very same return row appends a second item; return
        // items carry no merge identity
        let mut aggregator = Aggregator::<ReturnInfoKind>::new();
        aggregator.ingest(return_fragment("123", "1", "X")).unwrap();
        aggregator.ingest(return_fragment("123", "1", "X")).unwrap();

        let documents = aggregator.into_documents();
        assert_eq!(documents[0].return_info[0].items.len(), 2);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let mut aggregator = Aggregator::<ReturnInfoKind>::new();
        aggregator.ingest(return_fragment("B", "1", "X")).unwrap();
        aggregator.ingest(return_fragment("A", "1", "Y")).unwrap();
        aggregator.ingest(return_fragment("B", "2", "Z")).unwrap();

        let keys: Vec<String> = aggregator
            .into_documents()
            .into_iter()
            .map(|order| order.order_number)
            .collect();
        assert_eq!(keys, ["B", "A"]);
    }

    #[test]
    fn test_delivery_items_merge_by_group_id() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator.ingest(delivery_fragment("222", "1", "g1")).unwrap();
        aggregator.ingest(delivery_fragment("222", "1", "g2")).unwrap();
        aggregator.ingest(delivery_fragment("222", "2", "g1")).unwrap();

        let documents = aggregator.into_documents();
        assert_eq!(documents.len(), 1);

        let deliveries = &documents[0].shipping_info.deliveries;
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].items.len(), 2);
        assert_eq!(deliveries[1].items.len(), 1);
        // No parcel columns anywhere: the field itself stays absent
        assert_eq!(deliveries[0].parcels, None);
    }

    #[test]
    fn test_identical_item_replay_is_idempotent() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator.ingest(delivery_fragment("222", "1", "g1")).unwrap();
        aggregator.ingest(delivery_fragment("222", "1", "g1")).unwrap();

        let documents = aggregator.into_documents();
        assert_eq!(documents[0].shipping_info.deliveries[0].items.len(), 1);
    }

    #[test]
    fn test_conflicting_item_content_is_fatal() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator.ingest(delivery_fragment("222", "1", "g1")).unwrap();

        let mut conflicting = delivery_fragment("222", "1", "g1");
        conflicting.delivery.items[0].quantity = 99;

        let error = aggregator.ingest(conflicting).unwrap_err();
        assert!(matches!(error, ConflictError::Item { .. }));
        let message = error.to_string();
        assert!(message.contains("delivery with id '1'"));
        assert!(message.contains("itemGroupId 'g1'"));
    }

    #[test]
    fn test_parcels_accumulate_by_id() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator
            .ingest(with_parcel(delivery_fragment("222", "1", "g1"), "p1", "DHL"))
            .unwrap();
        aggregator
            .ingest(with_parcel(delivery_fragment("222", "1", "g2"), "p2", "PPL"))
            .unwrap();

        let documents = aggregator.into_documents();
        let parcels = documents[0].shipping_info.deliveries[0]
            .parcels
            .as_ref()
            .unwrap();
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels[0].id, "p1");
        assert_eq!(parcels[1].id, "p2");
    }

    #[test]
    fn test_identical_parcel_replay_is_idempotent() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        let fragment = with_parcel(delivery_fragment("222", "1", "g1"), "p1", "DHL");
        aggregator.ingest(fragment.clone()).unwrap();
        aggregator.ingest(fragment).unwrap();

        let documents = aggregator.into_documents();
        let delivery = &documents[0].shipping_info.deliveries[0];
        assert_eq!(delivery.items.len(), 1);
        assert_eq!(delivery.parcels.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_conflicting_parcel_content_is_fatal() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator
            .ingest(with_parcel(delivery_fragment("222", "1", "g1"), "p1", "DHL"))
            .unwrap();

        let error = aggregator
            .ingest(with_parcel(delivery_fragment("222", "1", "g2"), "p1", "PPL"))
            .unwrap_err();
        assert!(matches!(error, ConflictError::Parcel { .. }));
        let message = error.to_string();
        assert!(message.contains("parcel with id 'p1'"));
        assert!(message.contains("DHL"));
        assert!(message.contains("PPL"));
    }

    #[test]
    fn test_same_delivery_id_under_different_orders_is_independent() {
        let mut aggregator = Aggregator::<DeliveriesKind>::new();
        aggregator.ingest(delivery_fragment("222", "1", "g1")).unwrap();
        let mut other_order = delivery_fragment("100", "1", "g1");
        other_order.delivery.items[0].quantity = 50;
        aggregator.ingest(other_order).unwrap();

        let documents = aggregator.into_documents();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].shipping_info.deliveries[0].items[0].quantity, 1);
        assert_eq!(documents[1].shipping_info.deliveries[0].items[0].quantity, 50);
    }
}
