//! Order action gating and admin status changes.

use serde::{Deserialize, Serialize};

use crate::model::Order;
use crate::types::{OrderStatus, PaymentMethod};

/// Which actions the order detail page offers the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct OrderActions {
    pub can_cancel: bool,
    pub can_pay: bool,
    pub can_upload_proof: bool,
    pub can_mark_received: bool,
    pub shows_shipment: bool,
}

impl OrderActions {
    /// Gate the actions on status and payment method.
    ///
    /// A missing payment method is treated as non-COD: the order still
    /// awaits a gateway payment.
    #[must_use]
    pub fn for_order(
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        has_tracking: bool,
        has_proof: bool,
    ) -> Self {
        let is_cod = payment_method == Some(PaymentMethod::Cod);
        let awaiting_payment = status == OrderStatus::MenungguPembayaran;

        Self {
            can_cancel: (!is_cod && awaiting_payment) || (is_cod && status == OrderStatus::Diproses),
            can_pay: !is_cod && awaiting_payment,
            can_upload_proof: payment_method == Some(PaymentMethod::BankTransfer)
                && awaiting_payment
                && !has_proof,
            can_mark_received: status == OrderStatus::Dikirim,
            shows_shipment: matches!(status, OrderStatus::Dikirim | OrderStatus::Selesai)
                && has_tracking,
        }
    }

    #[must_use]
    pub fn of(order: &Order) -> Self {
        Self::for_order(
            order.status,
            order.payment_method,
            order.has_tracking(),
            order
                .payment_proof_url
                .as_deref()
                .is_some_and(|url| !url.is_empty()),
        )
    }

    /// Whether any button needs to be rendered.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.can_cancel || self.can_pay || self.can_upload_proof || self.can_mark_received
    }
}

/// A status change that cannot be sent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdateError {
    /// Shipping an order needs a courier and a tracking number.
    #[error("Kurir dan Nomor Resi tidak boleh kosong")]
    MissingShipment,
}

/// Body of `PUT /admin/orders/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl StatusUpdate {
    /// Build a status change. Shipment fields are kept only for `Dikirim`.
    ///
    /// # Errors
    ///
    /// [`StatusUpdateError::MissingShipment`] when the target is `Dikirim`
    /// and the trimmed courier or tracking number is blank.
    pub fn new(
        status: OrderStatus,
        courier: Option<&str>,
        tracking_number: Option<&str>,
    ) -> Result<Self, StatusUpdateError> {
        if status != OrderStatus::Dikirim {
            return Ok(Self {
                status,
                courier: None,
                tracking_number: None,
            });
        }

        let courier = non_blank(courier).ok_or(StatusUpdateError::MissingShipment)?;
        let tracking_number = non_blank(tracking_number).ok_or(StatusUpdateError::MissingShipment)?;
        Ok(Self {
            status,
            courier: Some(courier),
            tracking_number: Some(tracking_number),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cod_cancellable_only_while_processing() {
        let cod = Some(PaymentMethod::Cod);
        assert!(OrderActions::for_order(OrderStatus::Diproses, cod, false, false).can_cancel);
        assert!(!OrderActions::for_order(OrderStatus::MenungguPembayaran, cod, false, false).can_cancel);
        assert!(!OrderActions::for_order(OrderStatus::Diproses, cod, false, false).can_pay);
    }

    #[test]
    fn test_transfer_awaiting_payment() {
        let actions = OrderActions::for_order(
            OrderStatus::MenungguPembayaran,
            Some(PaymentMethod::BankTransfer),
            false,
            false,
        );
        assert!(actions.can_cancel);
        assert!(actions.can_pay);
        assert!(actions.can_upload_proof);
        assert!(!actions.can_mark_received);

        let with_proof = OrderActions::for_order(
            OrderStatus::MenungguPembayaran,
            Some(PaymentMethod::BankTransfer),
            false,
            true,
        );
        assert!(!with_proof.can_upload_proof);
        assert!(with_proof.can_pay);
    }

    #[test]
    fn test_missing_method_counts_as_non_cod() {
        let actions = OrderActions::for_order(OrderStatus::MenungguPembayaran, None, false, false);
        assert!(actions.can_pay);
        assert!(actions.can_cancel);
        assert!(!actions.can_upload_proof);
        assert!(!OrderActions::for_order(OrderStatus::Diproses, None, false, false).can_cancel);
    }

    #[test]
    fn test_shipment_shown_only_with_tracking() {
        let shipped = OrderActions::for_order(OrderStatus::Dikirim, None, true, false);
        assert!(shipped.shows_shipment);
        assert!(shipped.can_mark_received);
        assert!(!OrderActions::for_order(OrderStatus::Selesai, None, false, false).shows_shipment);
        assert!(OrderActions::for_order(OrderStatus::Selesai, None, true, false).shows_shipment);
        assert!(!OrderActions::for_order(OrderStatus::Dikemas, None, true, false).shows_shipment);
        assert!(!OrderActions::for_order(OrderStatus::Selesai, None, true, false).any());
    }

    #[test]
    fn test_shipping_requires_courier_and_resi() {
        assert_eq!(
            StatusUpdate::new(OrderStatus::Dikirim, Some("JNE"), Some("  ")),
            Err(StatusUpdateError::MissingShipment)
        );
        assert_eq!(
            StatusUpdate::new(OrderStatus::Dikirim, None, Some("JNE123")),
            Err(StatusUpdateError::MissingShipment)
        );
        let update = StatusUpdate::new(OrderStatus::Dikirim, Some(" JNE "), Some("JNE123 ")).unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "status": "Dikirim", "courier": "JNE", "trackingNumber": "JNE123" })
        );
    }

    #[test]
    fn test_other_statuses_drop_shipment_fields() {
        let update = StatusUpdate::new(OrderStatus::Dikemas, Some("JNE"), Some("X1")).unwrap();
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "status": "Dikemas" }));
    }
}
