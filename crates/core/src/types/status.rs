//! Status enums for orders, payments and user roles.
//!
//! Wire names match the backend exactly (`Menunggu_Pembayaran`,
//! `BANK_TRANSFER`, `ADMIN`), so these types can be used directly in
//! request and response bodies.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders normally progress `MenungguPembayaran → Diproses → Dikemas →
/// Dikirim → Selesai`; any order may end as `Dibatalkan`. The backend owns
/// transitions; admins may set any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Awaiting payment.
    #[default]
    #[serde(rename = "Menunggu_Pembayaran")]
    MenungguPembayaran,
    /// Paid (or COD accepted) and being processed.
    Diproses,
    /// Being packed.
    Dikemas,
    /// Handed to the courier.
    Dikirim,
    /// Received by the customer.
    Selesai,
    /// Cancelled.
    Dibatalkan,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::MenungguPembayaran,
        Self::Diproses,
        Self::Dikemas,
        Self::Dikirim,
        Self::Selesai,
        Self::Dibatalkan,
    ];

    /// The wire name used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MenungguPembayaran => "Menunggu_Pembayaran",
            Self::Diproses => "Diproses",
            Self::Dikemas => "Dikemas",
            Self::Dikirim => "Dikirim",
            Self::Selesai => "Selesai",
            Self::Dibatalkan => "Dibatalkan",
        }
    }

    /// Human-readable label (first underscore replaced by a space).
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    /// CSS classes for the status badge.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Selesai => "bg-green-100 text-green-700",
            Self::Dikirim => "bg-blue-100 text-blue-700",
            Self::Dikemas => "bg-indigo-100 text-indigo-700",
            Self::Diproses => "bg-purple-100 text-purple-700",
            Self::Dibatalkan => "bg-red-100 text-red-700",
            Self::MenungguPembayaran => "bg-yellow-100 text-yellow-700",
        }
    }

    /// Whether the order's total counts towards revenue.
    #[must_use]
    pub const fn counts_as_revenue(&self) -> bool {
        !matches!(self, Self::Dibatalkan | Self::MenungguPembayaran)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Bank transfer, paid through the gateway or with an uploaded proof.
    BankTransfer,
    /// Any method this storefront does not know about.
    #[serde(other)]
    Other,
}

impl PaymentMethod {
    /// The wire name used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::BankTransfer => "BANK TRANSFER",
            Self::Other => "Lainnya",
        }
    }

    /// Label for an optional method; orders may not have one yet.
    #[must_use]
    pub fn label_or_unset(method: Option<Self>) -> &'static str {
        method.map_or("Belum Dipilih", |m| m.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Role of a storefront user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    User,
    /// Back-office administrator.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}
