//! Mirrors of backend-owned entities.
//!
//! The backend validates and persists every entity. These structs carry only
//! the fields the storefront renders, and tolerate missing optional fields
//! (`#[serde(default)]`) because different endpoints return different
//! projections of the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CartItemId, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, Rupiah, UserId,
    UserRole,
};

/// Image shown when a product has none.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.svg";

/// A signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Whether the profile has both an address and a city to ship to.
    #[must_use]
    pub fn has_shipping_address(&self) -> bool {
        is_present(self.address.as_deref()) && is_present(self.city.as_deref())
    }

    /// Whether the user may open the admin console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Rupiah,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Stock availability label.
    #[must_use]
    pub const fn stock_label(&self) -> &'static str {
        if self.in_stock() {
            "In Stock"
        } else {
            "Out of Stock"
        }
    }

    /// CSS class for the stock label: plenty, running low, or none.
    #[must_use]
    pub const fn stock_class(&self) -> &'static str {
        if self.stock > 10 {
            "text-green-600"
        } else if self.stock > 0 {
            "text-yellow-600"
        } else {
            "text-red-600"
        }
    }

    /// Image URL, falling back to the placeholder.
    #[must_use]
    pub fn image_url(&self) -> &str {
        image_or_placeholder(self.image.as_deref())
    }
}

/// The signed-in user's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub quantity: u32,
    pub product: Product,
}

impl CartItem {
    /// `quantity × unit price` using the committed quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupiah {
        self.product.price * self.quantity
    }
}

/// Customer details embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// The product projection embedded in order items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One line of an order. `price` is the unit price at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub price: Rupiah,
    #[serde(default)]
    pub product: Option<OrderProduct>,
}

impl OrderItem {
    /// `quantity × unit price`.
    #[must_use]
    pub fn line_total(&self) -> Rupiah {
        self.price * self.quantity
    }

    /// Product title, or a placeholder when the product was deleted.
    #[must_use]
    pub fn title(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.title.as_deref())
            .unwrap_or("Produk tidak tersedia")
    }

    /// Product image, falling back to the placeholder.
    #[must_use]
    pub fn image_url(&self) -> &str {
        image_or_placeholder(self.product.as_ref().and_then(|p| p.image.as_deref()))
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    pub total: Rupiah,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<OrderUser>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
}

impl Order {
    /// Customer name, or a placeholder when the account was deleted.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("User Dihapus")
    }

    /// Whether a non-blank tracking number has been recorded.
    #[must_use]
    pub fn has_tracking(&self) -> bool {
        is_present(self.tracking_number.as_deref())
    }
}

/// A shipping service quoted for a courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub service: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub etd: String,
    pub cost: Rupiah,
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn image_or_placeholder(image: Option<&str>) -> &str {
    image.filter(|s| !s.is_empty()).unwrap_or(PLACEHOLDER_IMAGE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_deserializes_backend_shape() {
        let order: Order = serde_json::from_value(json!({
            "id": 12,
            "status": "Dikirim",
            "paymentMethod": "COD",
            "total": 95000,
            "createdAt": "2026-10-01T03:00:00.000Z",
            "user": { "name": "Sari", "email": "sari@example.com" },
            "items": [
                { "id": 1, "quantity": 2, "price": 40000, "product": { "title": "Whiskas Tuna 1.2kg" } }
            ],
            "courier": "JNE - REG",
            "trackingNumber": "JNE123",
            "shippedAt": null
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Dikirim);
        assert_eq!(order.payment_method, Some(PaymentMethod::Cod));
        assert_eq!(order.items[0].line_total(), Rupiah::from_i64(80_000));
        assert_eq!(order.customer_name(), "Sari");
        assert!(order.has_tracking());
        assert!(order.payment_proof_url.is_none());
    }

    #[test]
    fn test_order_item_without_product() {
        let item: OrderItem =
            serde_json::from_value(json!({ "id": 3, "quantity": 1, "price": 5000 })).unwrap();
        assert_eq!(item.title(), "Produk tidak tersedia");
        assert_eq!(item.image_url(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_user_shipping_address_requires_both_fields() {
        let mut user: User = serde_json::from_value(json!({
            "id": 1, "name": "Budi", "email": "budi@example.com", "city": "Bandung"
        }))
        .unwrap();
        assert!(!user.has_shipping_address());
        user.address = Some("   ".to_string());
        assert!(!user.has_shipping_address());
        user.address = Some("Jl. Merdeka 1".to_string());
        assert!(user.has_shipping_address());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_product_stock_labels() {
        let mut product: Product = serde_json::from_value(json!({
            "id": 5, "title": "Shampoo Kucing", "price": 30000, "stock": 11
        }))
        .unwrap();
        assert_eq!(product.stock_class(), "text-green-600");
        product.stock = 3;
        assert_eq!(product.stock_class(), "text-yellow-600");
        assert_eq!(product.stock_label(), "In Stock");
        product.stock = 0;
        assert_eq!(product.stock_label(), "Out of Stock");
        assert_eq!(product.image_url(), PLACEHOLDER_IMAGE);
    }
}
