//! Checkout pricing and order placement.
//!
//! The checkout page reconciles the `items=` ids carried over from the cart
//! with the backend cart, prices the selection, adds the shipping quote the
//! customer picked and finally produces the [`CreateOrderRequest`] body.

use serde::{Deserialize, Serialize};

use crate::model::{CartItem, ShippingOption, User};
use crate::types::{CartItemId, PaymentMethod, Rupiah};

/// Why checkout cannot show a summary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The backend cart is empty.
    #[error("Keranjang belanja Anda kosong.")]
    EmptyCart,
    /// None of the requested ids exist in the cart.
    #[error("Item yang dipilih tidak valid.")]
    InvalidSelection,
}

/// Why an order cannot be placed yet.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderDraftError {
    #[error("Tidak ada item untuk dipesan.")]
    NoItems,
    #[error("Harap lengkapi alamat & kota di profil Anda.")]
    IncompleteAddress,
    #[error("Harap pilih jasa pengiriman terlebih dahulu.")]
    NoShipping,
}

/// Parse the comma-separated `items=` query. Entries that are not ids are dropped.
#[must_use]
pub fn parse_item_ids(raw: &str) -> Vec<CartItemId> {
    raw.split(',')
        .filter_map(|part| part.parse::<CartItemId>().ok())
        .collect()
}

/// Supported couriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Courier {
    Jne,
    Jnt,
}

impl Courier {
    pub const ALL: [Self; 2] = [Self::Jne, Self::Jnt];

    /// Code sent to the shipping-cost endpoint.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Jne => "jne",
            Self::Jnt => "jnt",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Jne => "JNE Express",
            Self::Jnt => "J&T Express",
        }
    }

    /// Value stored on the order: `JNE - REG`.
    #[must_use]
    pub fn service_label(&self, service: &str) -> String {
        format!("{} - {service}", self.code().to_uppercase())
    }
}

impl std::str::FromStr for Courier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("invalid courier: {s}"))
    }
}

/// Whether shipping quotes can be requested: a courier is chosen and the
/// profile has a city.
#[must_use]
pub fn should_quote(courier: Option<Courier>, user: &User) -> bool {
    courier.is_some() && user.city.as_deref().is_some_and(|c| !c.trim().is_empty())
}

/// Look up the chosen service among the quoted options.
///
/// Returns `None` when no service is chosen or the quote no longer offers
/// it (for example after the courier changed).
#[must_use]
pub fn find_option<'a>(
    options: &'a [ShippingOption],
    service: Option<&str>,
) -> Option<&'a ShippingOption> {
    let service = service?;
    options.iter().find(|option| option.service == service)
}

/// Cost of the chosen shipping option, zero when none.
#[must_use]
pub fn shipping_cost(option: Option<&ShippingOption>) -> Rupiah {
    option.map_or(Rupiah::ZERO, |o| o.cost)
}

/// The priced selection shown on the checkout page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutSummary {
    pub items: Vec<CartItem>,
    pub subtotal: Rupiah,
}

impl CheckoutSummary {
    /// Price the cart items whose ids were requested, in cart order.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when the cart has no items, and
    /// [`CheckoutError::InvalidSelection`] when ids were given but none
    /// match the cart.
    pub fn build(cart: &[CartItem], selected: &[CartItemId]) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if selected.is_empty() {
            return Ok(Self::default());
        }

        let items: Vec<CartItem> = cart
            .iter()
            .filter(|item| selected.contains(&item.id))
            .cloned()
            .collect();
        if items.is_empty() {
            return Err(CheckoutError::InvalidSelection);
        }

        let subtotal = items.iter().map(CartItem::line_total).sum();
        Ok(Self { items, subtotal })
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn grand_total(&self, shipping: Option<&ShippingOption>) -> Rupiah {
        self.subtotal + shipping_cost(shipping)
    }

    #[must_use]
    pub fn item_ids(&self) -> Vec<CartItemId> {
        self.items.iter().map(|item| item.id).collect()
    }
}

/// Body of `POST /orders/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub payment_method: PaymentMethod,
    pub cart_item_ids: Vec<CartItemId>,
    pub shipping_cost: Rupiah,
    pub courier_service: String,
}

/// The customer's checkout choices, validated into an order request.
#[derive(Debug, Clone, Copy)]
pub struct OrderDraft<'a> {
    pub summary: &'a CheckoutSummary,
    pub user: &'a User,
    pub courier: Option<Courier>,
    pub shipping: Option<&'a ShippingOption>,
    pub payment_method: PaymentMethod,
}

impl OrderDraft<'_> {
    /// Check the draft in the order the page reports problems.
    ///
    /// # Errors
    ///
    /// `NoItems`, then `IncompleteAddress`, then `NoShipping`.
    pub fn validate(&self) -> Result<CreateOrderRequest, OrderDraftError> {
        if self.summary.items.is_empty() {
            return Err(OrderDraftError::NoItems);
        }
        if !self.user.has_shipping_address() {
            return Err(OrderDraftError::IncompleteAddress);
        }
        let (Some(courier), Some(option)) = (self.courier, self.shipping) else {
            return Err(OrderDraftError::NoShipping);
        };

        Ok(CreateOrderRequest {
            payment_method: self.payment_method,
            cart_item_ids: self.summary.item_ids(),
            shipping_cost: option.cost,
            courier_service: courier.service_label(&option.service),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cart::tests::item;
    use crate::types::{UserId, UserRole};

    fn user(city: Option<&str>, address: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            name: "Dewi".to_string(),
            email: "dewi@example.com".to_string(),
            phone: None,
            city: city.map(str::to_string),
            address: address.map(str::to_string),
            role: UserRole::User,
        }
    }

    fn reg() -> ShippingOption {
        ShippingOption {
            service: "REG".to_string(),
            description: "Layanan Reguler".to_string(),
            etd: "2-3".to_string(),
            cost: Rupiah::from_i64(18_000),
        }
    }

    fn cart() -> Vec<CartItem> {
        vec![item(1, 25_000, 2), item(2, 10_000, 1), item(3, 5_000, 4)]
    }

    #[test]
    fn test_parse_item_ids_drops_garbage() {
        let ids = parse_item_ids("1,x,3,");
        assert_eq!(ids, vec![CartItemId::new(1), CartItemId::new(3)]);
        assert!(parse_item_ids("").is_empty());
    }

    #[test]
    fn test_build_prices_selection_in_cart_order() {
        let summary =
            CheckoutSummary::build(&cart(), &[CartItemId::new(3), CartItemId::new(1)]).unwrap();
        assert_eq!(summary.item_ids(), vec![CartItemId::new(1), CartItemId::new(3)]);
        assert_eq!(summary.subtotal, Rupiah::from_i64(70_000));
        assert_eq!(summary.grand_total(Some(&reg())), Rupiah::from_i64(88_000));
        assert_eq!(summary.grand_total(None), Rupiah::from_i64(70_000));
    }

    #[test]
    fn test_build_errors() {
        assert_eq!(
            CheckoutSummary::build(&[], &[CartItemId::new(1)]),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(
            CheckoutSummary::build(&cart(), &[CartItemId::new(42)]),
            Err(CheckoutError::InvalidSelection)
        );
        let empty = CheckoutSummary::build(&cart(), &[]).unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.subtotal, Rupiah::ZERO);
    }

    #[test]
    fn test_quote_needs_courier_and_city() {
        assert!(should_quote(Some(Courier::Jne), &user(Some("Bandung"), None)));
        assert!(!should_quote(None, &user(Some("Bandung"), None)));
        assert!(!should_quote(Some(Courier::Jnt), &user(None, None)));
    }

    #[test]
    fn test_find_option_after_courier_change() {
        let options = vec![reg()];
        assert!(find_option(&options, Some("REG")).is_some());
        assert!(find_option(&options, Some("EZ")).is_none());
        assert!(find_option(&options, None).is_none());
    }

    #[test]
    fn test_validate_checks_in_order() {
        let full = CheckoutSummary::build(&cart(), &[CartItemId::new(1)]).unwrap();
        let empty = CheckoutSummary::default();
        let no_address = user(Some("Bandung"), None);
        let complete = user(Some("Bandung"), Some("Jl. Asia Afrika 8"));
        let option = reg();

        let draft = OrderDraft {
            summary: &empty,
            user: &no_address,
            courier: None,
            shipping: None,
            payment_method: PaymentMethod::default(),
        };
        assert_eq!(draft.validate(), Err(OrderDraftError::NoItems));

        let draft = OrderDraft { summary: &full, ..draft };
        assert_eq!(draft.validate(), Err(OrderDraftError::IncompleteAddress));

        let draft = OrderDraft { user: &complete, ..draft };
        assert_eq!(draft.validate(), Err(OrderDraftError::NoShipping));

        let draft = OrderDraft {
            courier: Some(Courier::Jne),
            shipping: Some(&option),
            ..draft
        };
        let request = draft.validate().unwrap();
        assert_eq!(request.courier_service, "JNE - REG");
        assert_eq!(request.payment_method, PaymentMethod::Cod);
    }

    #[test]
    fn test_create_order_request_wire_shape() {
        let request = CreateOrderRequest {
            payment_method: PaymentMethod::BankTransfer,
            cart_item_ids: vec![CartItemId::new(4), CartItemId::new(7)],
            shipping_cost: Rupiah::from_i64(9_000),
            courier_service: Courier::Jnt.service_label("EZ"),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "paymentMethod": "BANK_TRANSFER",
                "cartItemIds": [4, 7],
                "shippingCost": 9000,
                "courierService": "JNT - EZ"
            })
        );
    }
}
