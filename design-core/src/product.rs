//! Garment options and pricing.
//!
//! Option names follow the storefront's wire vocabulary (`tshirt`,
//! `left-sleeve`, `XL`, ...). Parsing an unknown name fails with
//! [`CanvasError::UnknownOption`] instead of carrying a loose string around.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::CanvasError;

macro_rules! wire_names {
    ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every value, in storefront display order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Wire name of the option.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = CanvasError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(CanvasError::UnknownOption {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Garment the design is printed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Classic tee.
    #[default]
    Tshirt,
    /// Pullover hoodie.
    Hoodie,
    /// Sleeveless tank top.
    Tank,
    /// Long sleeve tee.
    Longsleeve,
}

wire_names!(ProductType, "product type", {
    Tshirt => "tshirt",
    Hoodie => "hoodie",
    Tank => "tank",
    Longsleeve => "longsleeve",
});

impl ProductType {
    /// Human-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tshirt => "T-Shirt",
            Self::Hoodie => "Hoodie",
            Self::Tank => "Tank Top",
            Self::Longsleeve => "Long Sleeve",
        }
    }
}

/// Garment color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum GarmentColor {
    #[default]
    Black,
    White,
    Navy,
    Gray,
    Red,
    Blue,
    Green,
}

wire_names!(GarmentColor, "color", {
    Black => "black",
    White => "white",
    Navy => "navy",
    Gray => "gray",
    Red => "red",
    Blue => "blue",
    Green => "green",
});

/// Garment size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum GarmentSize {
    Xs,
    S,
    #[default]
    M,
    L,
    Xl,
    Xxl,
}

wire_names!(GarmentSize, "size", {
    Xs => "XS",
    S => "S",
    M => "M",
    L => "L",
    Xl => "XL",
    Xxl => "XXL",
});

/// Where on the garment the design is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Placement {
    #[default]
    Front,
    Back,
    LeftSleeve,
    RightSleeve,
}

wire_names!(Placement, "placement", {
    Front => "front",
    Back => "back",
    LeftSleeve => "left-sleeve",
    RightSleeve => "right-sleeve",
});

/// Product settings the renderer reads. Size lives with the studio since it
/// affects neither drawing nor price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductContext {
    /// Garment type; selects the mockup and base price.
    pub product_type: ProductType,
    /// Garment color.
    pub color: GarmentColor,
    /// Print placement.
    pub placement: Placement,
}

impl ProductContext {
    /// Overlay label, e.g. `"tshirt • black • front"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} • {} • {}", self.product_type, self.color, self.placement)
    }
}

/// An amount in US cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    cents: u64,
}

impl Price {
    /// Price from a cent amount.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }

    /// Two-decimal string without currency sign, e.g. `"26.99"`.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.cents / 100, self.cents % 100)
    }

    /// Amount in dollars, for wire formats that carry a JSON number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_dollars(self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

/// Base price per product type plus a flat per-element surcharge.
///
/// A `base_cents` map read from config is merged over the default prices,
/// so it only needs the products it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceList {
    /// Base price in cents, per product type.
    #[serde(deserialize_with = "merge_base_cents")]
    pub base_cents: BTreeMap<ProductType, u64>,
    /// Surcharge in cents for each element on the canvas.
    pub element_surcharge_cents: u64,
}

impl Default for PriceList {
    fn default() -> Self {
        let base_cents = BTreeMap::from([
            (ProductType::Tshirt, 2499),
            (ProductType::Hoodie, 4999),
            (ProductType::Tank, 1999),
            (ProductType::Longsleeve, 2999),
        ]);
        Self {
            base_cents,
            element_surcharge_cents: 200,
        }
    }
}

fn merge_base_cents<'de, D>(deserializer: D) -> Result<BTreeMap<ProductType, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<ProductType, u64>::deserialize(deserializer)?;
    let mut base_cents = PriceList::default().base_cents;
    base_cents.extend(overrides);
    Ok(base_cents)
}

impl PriceList {
    /// Base price for a product. A product missing from the list is priced
    /// as a T-shirt.
    #[must_use]
    pub fn base(&self, product: ProductType) -> Price {
        let cents = self
            .base_cents
            .get(&product)
            .or_else(|| self.base_cents.get(&ProductType::Tshirt))
            .copied()
            .unwrap_or_default();
        Price::from_cents(cents)
    }

    /// `base(product) + surcharge × element_count`.
    #[must_use]
    pub fn price(&self, product: ProductType, element_count: usize) -> Price {
        let count = u64::try_from(element_count).unwrap_or(u64::MAX);
        let surcharge = self.element_surcharge_cents.saturating_mul(count);
        Price::from_cents(self.base(product).cents().saturating_add(surcharge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prices_match_catalog() {
        let prices = PriceList::default();
        assert_eq!(prices.price(ProductType::Tshirt, 0).to_string(), "$24.99");
        assert_eq!(prices.price(ProductType::Hoodie, 0).to_string(), "$49.99");
        assert_eq!(prices.price(ProductType::Tank, 0).to_string(), "$19.99");
        assert_eq!(prices.price(ProductType::Longsleeve, 0).to_string(), "$29.99");
    }

    #[test]
    fn surcharge_per_element() {
        let prices = PriceList::default();
        let one = prices.price(ProductType::Tshirt, 1);
        assert_eq!(one.to_decimal_string(), "26.99");
        assert_eq!(prices.price(ProductType::Hoodie, 3).cents(), 5599);
    }

    #[test]
    fn price_is_monotonic_in_element_count() {
        let prices = PriceList::default();
        for product in ProductType::ALL {
            let mut last = prices.price(*product, 0);
            for n in 1..20 {
                let next = prices.price(*product, n);
                assert!(next > last);
                last = next;
            }
        }
    }

    #[test]
    fn missing_base_falls_back_to_tshirt() {
        let mut prices = PriceList::default();
        prices.base_cents.remove(&ProductType::Tank);
        assert_eq!(prices.base(ProductType::Tank), Price::from_cents(2499));
    }

    #[test]
    fn wire_names_parse_and_print() {
        assert_eq!("left-sleeve".parse::<Placement>().expect("parse"), Placement::LeftSleeve);
        assert_eq!("XXL".parse::<GarmentSize>().expect("parse"), GarmentSize::Xxl);
        assert_eq!(ProductType::Longsleeve.to_string(), "longsleeve");
        assert!(matches!(
            "poncho".parse::<ProductType>(),
            Err(CanvasError::UnknownOption { field: "product type", .. })
        ));
    }

    #[test]
    fn context_label_uses_wire_names() {
        assert_eq!(ProductContext::default().label(), "tshirt • black • front");
        let context = ProductContext {
            product_type: ProductType::Hoodie,
            color: GarmentColor::Navy,
            placement: Placement::LeftSleeve,
        };
        assert_eq!(context.label(), "hoodie • navy • left-sleeve");
    }

    #[test]
    fn serde_matches_wire_names() {
        for size in GarmentSize::ALL {
            let json = serde_json::to_string(size).expect("serialize");
            assert_eq!(json, format!("\"{}\"", size.as_str()));
        }
        for placement in Placement::ALL {
            let json = serde_json::to_string(placement).expect("serialize");
            assert_eq!(json, format!("\"{}\"", placement.as_str()));
        }
        let context = ProductContext::default();
        let json = serde_json::to_value(context).expect("serialize");
        assert_eq!(json["productType"], "tshirt");
        assert_eq!(json["color"], "black");
        assert_eq!(json["placement"], "front");
    }

    #[test]
    fn price_list_deserializes_with_defaults() {
        let prices: PriceList =
            serde_json::from_str(r#"{"element_surcharge_cents": 350}"#).expect("parse");
        assert_eq!(prices.element_surcharge_cents, 350);
        assert_eq!(prices.base(ProductType::Hoodie).cents(), 4999);
    }

    #[test]
    fn partial_base_prices_merge_over_defaults() {
        let prices: PriceList =
            serde_json::from_str(r#"{"base_cents": {"hoodie": 5499}}"#).expect("parse");
        assert_eq!(prices.base(ProductType::Hoodie).cents(), 5499);
        assert_eq!(prices.base(ProductType::Tank).cents(), 1999);
        assert_eq!(prices.base(ProductType::Tshirt).cents(), 2499);
        assert_eq!(prices.base(ProductType::Longsleeve).cents(), 2999);
        assert_eq!(prices.element_surcharge_cents, 200);
    }
}
