//! Product catalog categories.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Rupiah;

/// Image assigned to new products until one is uploaded.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/product_01.png";

/// Product category as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductCategory {
    /// Medicine.
    Obat,
    /// Supplements and vitamins.
    #[serde(rename = "Suplemen_dan_Vitamin")]
    SuplemenDanVitamin,
    /// Grooming products.
    Grooming,
    /// Everything else.
    #[default]
    #[serde(rename = "Produk_Lainnya")]
    ProdukLainnya,
}

impl ProductCategory {
    /// Every category, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Obat,
        Self::SuplemenDanVitamin,
        Self::Grooming,
        Self::ProdukLainnya,
    ];

    /// The wire name used by the backend and in `?category=` links.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Obat => "Obat",
            Self::SuplemenDanVitamin => "Suplemen_dan_Vitamin",
            Self::Grooming => "Grooming",
            Self::ProdukLainnya => "Produk_Lainnya",
        }
    }

    /// Label used in menus and pickers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Obat => "Obat",
            Self::SuplemenDanVitamin => "Suplemen & Vitamin",
            Self::Grooming => "Grooming",
            Self::ProdukLainnya => "Produk Lainnya",
        }
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("invalid product category: {s}"))
    }
}

/// Display a raw category string from the backend (`_` becomes a space).
///
/// Products may carry categories this storefront has no variant for, so
/// tables show the raw value rather than failing.
#[must_use]
pub fn display_category(raw: Option<&str>) -> String {
    raw.filter(|s| !s.is_empty())
        .map_or_else(|| "-".to_string(), |s| s.replace('_', " "))
}

/// Admin product form input that cannot be saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("Nama produk wajib diisi.")]
    MissingTitle,
    #[error("Harga harus berupa angka dan tidak boleh negatif.")]
    InvalidPrice,
    #[error("Stok harus berupa bilangan bulat dan tidak boleh negatif.")]
    InvalidStock,
    #[error("Kategori tidak dikenal.")]
    InvalidCategory,
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub price: Rupiah,
    pub stock: i32,
    pub category: ProductCategory,
    pub image: String,
}

impl ProductInput {
    /// Validate the raw admin form fields.
    ///
    /// Blank category and image fall back to [`ProductCategory::default`]
    /// and [`DEFAULT_PRODUCT_IMAGE`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid field as a [`ProductFormError`].
    pub fn parse(
        title: &str,
        description: &str,
        price: &str,
        stock: &str,
        category: &str,
        image: &str,
    ) -> Result<Self, ProductFormError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ProductFormError::MissingTitle);
        }

        let price = Decimal::from_str(price.trim())
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or(ProductFormError::InvalidPrice)?;
        let stock = stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or(ProductFormError::InvalidStock)?;

        let category = match category.trim() {
            "" => ProductCategory::default(),
            raw => raw
                .parse()
                .map_err(|_| ProductFormError::InvalidCategory)?,
        };
        let image = match image.trim() {
            "" => DEFAULT_PRODUCT_IMAGE.to_string(),
            raw => raw.to_string(),
        };

        Ok(Self {
            title: title.to_string(),
            description: description.trim().to_string(),
            price: Rupiah::new(price),
            stock,
            category,
            image,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        for category in ProductCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<ProductCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_default_category() {
        assert_eq!(ProductCategory::default(), ProductCategory::ProdukLainnya);
    }

    #[test]
    fn test_display_category() {
        assert_eq!(display_category(Some("Suplemen_dan_Vitamin")), "Suplemen dan Vitamin");
        assert_eq!(display_category(None), "-");
        assert_eq!(display_category(Some("")), "-");
    }

    #[test]
    fn test_product_input_defaults() {
        let input = ProductInput::parse(" Pasir Kucing ", "", "85000", "12", "", "").unwrap();
        assert_eq!(input.title, "Pasir Kucing");
        assert_eq!(input.category, ProductCategory::ProdukLainnya);
        assert_eq!(input.image, DEFAULT_PRODUCT_IMAGE);
        assert_eq!(input.price, Rupiah::from_i64(85_000));
    }

    #[test]
    fn test_product_input_rejects_bad_numbers() {
        let parse = |price, stock| ProductInput::parse("Sisir", "", price, stock, "Grooming", "");
        assert_eq!(parse("-1", "3"), Err(ProductFormError::InvalidPrice));
        assert_eq!(parse("murah", "3"), Err(ProductFormError::InvalidPrice));
        assert_eq!(parse("15000", "-2"), Err(ProductFormError::InvalidStock));
        assert_eq!(parse("15000", "1.5"), Err(ProductFormError::InvalidStock));
        assert!(parse("15000.50", "0").is_ok());
    }

    #[test]
    fn test_product_input_unknown_category() {
        let result = ProductInput::parse("Sisir", "", "1000", "1", "Mainan", "");
        assert_eq!(result, Err(ProductFormError::InvalidCategory));
        assert_eq!(
            ProductInput::parse("  ", "", "1000", "1", "", ""),
            Err(ProductFormError::MissingTitle)
        );
    }
}
