//! Row Decoder: converts one raw CSV row into a typed fragment for a
//! chosen record kind.
//!
//! Decoding is a pure function of the row and the kind. It validates
//! required columns (reported in canonical order), coerces numeric and
//! boolean columns, and treats empty strings in optional nested columns
//! as absent.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};
use crate::models::{
    Delivery, DeliveryFragment, DeliveryItem, LineItemState, Measurements, Parcel,
    ReturnInfoEntry, ReturnInfoFragment, ReturnItem, TrackingData,
};
use crate::parser::RawRow;

// =============================================================================
// Record Kinds
// =============================================================================

/// The supported CSV record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Line-item state changes; one row per document, no merging.
    LineItemState,
    /// Return-info entries, consolidated per order.
    ReturnInfo,
    /// Delivery/parcel structures, consolidated per order.
    Deliveries,
}

impl RecordKind {
    /// Required columns for this kind, in canonical order.
    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            RecordKind::LineItemState => {
                &["orderNumber", "lineItemId", "quantity", "fromState", "toState"]
            }
            RecordKind::ReturnInfo => {
                &["orderNumber", "quantity", "lineItemId", "shipmentState", "_returnId"]
            }
            RecordKind::Deliveries => {
                &["orderNumber", "delivery.id", "_itemGroupId", "item.id", "item.quantity"]
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::LineItemState => "lineitemstate",
            RecordKind::ReturnInfo => "returninfo",
            RecordKind::Deliveries => "deliveries",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lineitemstate" => Ok(RecordKind::LineItemState),
            "returninfo" => Ok(RecordKind::ReturnInfo),
            "deliveries" => Ok(RecordKind::Deliveries),
            other => Err(format!(
                "Unknown record type '{other}': expected lineitemstate, returninfo or deliveries"
            )),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Column Access Helpers
// =============================================================================

/// Fail unless every required column is present in the row. Missing names
/// are reported in canonical order, not the order encountered.
fn require_headers(row: &RawRow, required: &[&str]) -> DecodeResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|header| !row.contains_key(**header))
        .map(|header| header.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::MissingHeaders(missing))
    }
}

fn field<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).and_then(Value::as_str).unwrap_or("")
}

/// An optional column: empty string means "not provided".
fn optional(row: &RawRow, column: &str) -> Option<String> {
    let value = field(row, column);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A base-10 integer column; non-numeric input is a fatal row error.
fn integer(row: &RawRow, column: &str) -> DecodeResult<i64> {
    let value = field(row, column);
    value.parse().map_err(|_| DecodeError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// An optional numeric column (measurements).
fn number(row: &RawRow, column: &str) -> DecodeResult<Option<f64>> {
    match optional(row, column) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| DecodeError::InvalidNumber {
                column: column.to_string(),
                value,
            }),
    }
}

// =============================================================================
// Fragment Decoders
// =============================================================================

/// Decode a line-item state row. The fragment is already the final
/// document shape.
pub fn line_item_state(row: &RawRow) -> DecodeResult<LineItemState> {
    require_headers(row, RecordKind::LineItemState.required_headers())?;

    Ok(LineItemState {
        order_number: field(row, "orderNumber").to_string(),
        line_item_id: field(row, "lineItemId").to_string(),
        quantity: integer(row, "quantity")?,
        from_state: field(row, "fromState").to_string(),
        to_state: field(row, "toState").to_string(),
    })
}

/// Decode a return-info row into an order fragment holding a single
/// entry with a single item.
pub fn return_info(row: &RawRow) -> DecodeResult<ReturnInfoFragment> {
    require_headers(row, RecordKind::ReturnInfo.required_headers())?;

    Ok(ReturnInfoFragment {
        order_number: field(row, "orderNumber").to_string(),
        entry: ReturnInfoEntry {
            return_id: field(row, "_returnId").to_string(),
            return_tracking_id: optional(row, "returnTrackingId"),
            return_date: optional(row, "returnDate"),
            items: vec![ReturnItem {
                quantity: integer(row, "quantity")?,
                line_item_id: field(row, "lineItemId").to_string(),
                comment: optional(row, "comment"),
                shipment_state: field(row, "shipmentState").to_string(),
            }],
        },
    })
}

/// Decode a delivery row into an order fragment holding a single delivery
/// with one item and, when parcel columns are present, one parcel.
pub fn delivery(row: &RawRow) -> DecodeResult<DeliveryFragment> {
    require_headers(row, RecordKind::Deliveries.required_headers())?;

    Ok(DeliveryFragment {
        order_number: field(row, "orderNumber").to_string(),
        delivery: Delivery {
            id: field(row, "delivery.id").to_string(),
            items: vec![DeliveryItem {
                group_id: field(row, "_itemGroupId").to_string(),
                id: field(row, "item.id").to_string(),
                quantity: integer(row, "item.quantity")?,
            }],
            parcels: parcel(row)?.map(|parcel| vec![parcel]),
        },
    })
}

// =============================================================================
// Parcel Assembly
// =============================================================================

/// Measurement columns and their struct destinations, applied uniformly:
/// either all are present for a parcel or none.
const MEASUREMENT_COLUMNS: [&str; 4] = [
    "parcel.height",
    "parcel.length",
    "parcel.width",
    "parcel.weight",
];

const TRACKING_COLUMNS: [&str; 5] = [
    "parcel.trackingId",
    "parcel.provider",
    "parcel.providerTransaction",
    "parcel.carrier",
    "parcel.isReturn",
];

/// Build a parcel from the row's dotted `parcel.*` columns. A parcel
/// exists only when `parcel.id` is non-empty.
fn parcel(row: &RawRow) -> DecodeResult<Option<Parcel>> {
    let Some(id) = optional(row, "parcel.id") else {
        return Ok(None);
    };

    let measurements = measurements(row, &id)?;
    let tracking_data = tracking_data(row);

    Ok(Some(Parcel {
        id,
        measurements,
        tracking_data,
    }))
}

fn measurements(row: &RawRow, parcel_id: &str) -> DecodeResult<Option<Measurements>> {
    let provided = MEASUREMENT_COLUMNS
        .into_iter()
        .filter(|&column| !field(row, column).is_empty())
        .count();

    match provided {
        0 => Ok(None),
        4 => {
            let mut values = [0.0f64; 4];
            for (value, column) in values.iter_mut().zip(MEASUREMENT_COLUMNS) {
                // provided count is 4, so the column cannot be empty here
                *value = number(row, column)?.unwrap_or_default();
            }
            let [height, length, width, weight] = values;
            Ok(Some(Measurements {
                height_in_millimeter: height,
                length_in_millimeter: length,
                width_in_millimeter: width,
                weight_in_gram: weight,
            }))
        }
        _ => Err(DecodeError::PartialMeasurements {
            parcel_id: parcel_id.to_string(),
        }),
    }
}

fn tracking_data(row: &RawRow) -> Option<TrackingData> {
    let provided = TRACKING_COLUMNS
        .into_iter()
        .any(|column| !field(row, column).is_empty());
    if !provided {
        return None;
    }

    Some(TrackingData {
        tracking_id: optional(row, "parcel.trackingId"),
        provider: optional(row, "parcel.provider"),
        provider_transaction: optional(row, "parcel.providerTransaction"),
        carrier: optional(row, "parcel.carrier"),
        // Lexical coercion: exactly "1" is true, anything else is false
        is_return: field(row, "parcel.isReturn") == "1",
    })
}
