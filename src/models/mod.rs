//! Domain models for the order CSV conversion pipeline.
//!
//! Two families of types live here:
//!
//! - **Fragments** - one row's typed, validated contribution to a target
//!   document ([`LineItemState`], [`ReturnInfoFragment`], [`DeliveryFragment`]).
//! - **Consolidated documents** - the accumulating per-order output records
//!   ([`ReturnOrder`], [`DeliveryOrder`]) that fragments are merged into.
//!
//! All documents serialize in the destination API's camelCase schema.
//! Optional nested fields are omitted when absent (never `null`), and the
//! internal grouping keys (`_returnId`, `_itemGroupId`) are kept on the
//! structs for merging but never serialized.

use serde::Serialize;

// =============================================================================
// Line Item State
// =============================================================================

/// A line-item state transition. One CSV row maps to exactly one of these;
/// no consolidation happens for this kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemState {
    pub order_number: String,
    pub line_item_id: String,
    pub quantity: i64,
    pub from_state: String,
    pub to_state: String,
}

// =============================================================================
// Return Info
// =============================================================================

/// Consolidated return-info document, keyed by order number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOrder {
    pub order_number: String,
    pub return_info: Vec<ReturnInfoEntry>,
}

/// One return-info grouping inside an order.
///
/// Entries with the same `_returnId` column are merged by appending their
/// items; the grouping key itself stays out of the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnInfoEntry {
    #[serde(skip_serializing)]
    pub return_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub items: Vec<ReturnItem>,
}

/// A returned line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub quantity: i64,
    pub line_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub shipment_state: String,
}

/// One row's contribution to a [`ReturnOrder`]: the order key plus a single
/// entry holding a single item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnInfoFragment {
    pub order_number: String,
    pub entry: ReturnInfoEntry,
}

// =============================================================================
// Deliveries
// =============================================================================

/// Consolidated delivery document, keyed by order number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrder {
    pub order_number: String,
    pub shipping_info: ShippingInfo,
}

/// Shipping section of an order, holding its deliveries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingInfo {
    pub deliveries: Vec<Delivery>,
}

/// One delivery inside an order, merged by delivery id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub id: String,
    pub items: Vec<DeliveryItem>,
    /// Absent when no row for this delivery carried parcel columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcels: Option<Vec<Parcel>>,
}

/// A delivered line item. Identity within a delivery is the
/// `_itemGroupId` column; the key is not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryItem {
    #[serde(skip_serializing)]
    pub group_id: String,
    pub id: String,
    pub quantity: i64,
}

/// A parcel attached to a delivery. Immutable once seen: repeated rows for
/// the same parcel id must be field-for-field identical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_data: Option<TrackingData>,
}

/// Parcel measurements. Either all four columns are present in a row
/// or none of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub height_in_millimeter: f64,
    pub length_in_millimeter: f64,
    pub width_in_millimeter: f64,
    pub weight_in_gram: f64,
}

/// Parcel tracking details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// `"1"` in the CSV maps to `true`; any other value maps to `false`.
    pub is_return: bool,
}

/// One row's contribution to a [`DeliveryOrder`]: the order key plus a
/// single delivery holding one item and at most one parcel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFragment {
    pub order_number: String,
    pub delivery: Delivery,
}
