use crate::enums::{Gender, MaritalStatus};
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Primary key of the customers table.
    CustomerId
);
record_id!(
    /// Primary key of the products table.
    ProductId
);
record_id!(
    /// Primary key of the sales table.
    SaleId
);

/// A row of the customers dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub email: String,
    pub country: String,
    pub join_date: NaiveDate,
    pub birth_date: NaiveDate,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Completed years of age on `as_of`. A birth date after `as_of` counts as zero.
    pub fn age_on(&self, as_of: NaiveDate) -> u32 {
        as_of.years_since(self.birth_date).unwrap_or(0)
    }
}

/// A row of the products dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub stock: u32,
}

impl Product {
    /// Checks the monetary invariants of the product row.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(CoreError::InvalidInput(
                format!("product {} price", self.id),
                format!("must be non-negative, got {}", self.price),
            ));
        }
        if self.cost.is_sign_negative() && !self.cost.is_zero() {
            return Err(CoreError::InvalidInput(
                format!("product {} cost", self.id),
                format!("must be non-negative, got {}", self.cost),
            ));
        }
        Ok(())
    }

    /// Price multiplied by a sold quantity, or `None` if it leaves the decimal range.
    pub fn checked_revenue_for(&self, quantity: u32) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(quantity))
    }

    /// Cost multiplied by a sold quantity, or `None` if it leaves the decimal range.
    pub fn checked_cost_for(&self, quantity: u32) -> Option<Decimal> {
        self.cost.checked_mul(Decimal::from(quantity))
    }

    /// Value of the units on hand at list price, or `None` if it leaves the decimal range.
    pub fn checked_stock_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.stock))
    }

    /// Price multiplied by a sold quantity, saturating at the decimal range.
    ///
    /// Exact for any record admitted by an analytics snapshot, which rejects rows whose
    /// money values do not fit.
    pub fn revenue_for(&self, quantity: u32) -> Decimal {
        self.price.saturating_mul(Decimal::from(quantity))
    }

    /// Cost multiplied by a sold quantity, saturating at the decimal range.
    pub fn cost_for(&self, quantity: u32) -> Decimal {
        self.cost.saturating_mul(Decimal::from(quantity))
    }

    /// Value of the units currently on hand at list price, saturating at the decimal range.
    pub fn stock_value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.stock))
    }
}

/// A row of the sales fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub order_date: NaiveDate,
    pub quantity: u32,
    /// Recorded monetary amount of the sale, when the source carries one.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl Sale {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.quantity == 0 {
            return Err(CoreError::InvalidInput(
                format!("sale {} quantity", self.id),
                "must be a positive integer".to_string(),
            ));
        }
        if let Some(amount) = self.amount {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(CoreError::InvalidInput(
                    format!("sale {} amount", self.id),
                    format!("must be non-negative, got {}", amount),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal, cost: Decimal) -> Product {
        Product {
            id: ProductId(7),
            name: "Kettle".to_string(),
            category: "Kitchen".to_string(),
            price,
            cost,
            stock: 4,
        }
    }

    #[test]
    fn test_product_rejects_negative_price() {
        let err = product(dec!(-1), dec!(1)).validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "product 7 price"));
        assert!(product(dec!(0), dec!(0)).validate().is_ok());
    }

    #[test]
    fn test_product_money_helpers() {
        let p = product(dec!(12.50), dec!(8));
        assert_eq!(p.revenue_for(3), dec!(37.50));
        assert_eq!(p.cost_for(3), dec!(24));
        assert_eq!(p.stock_value(), dec!(50.00));
    }

    #[test]
    fn test_checked_money_helpers_detect_overflow() {
        let mut p = product(Decimal::MAX, dec!(1));
        p.stock = 2;
        assert_eq!(p.checked_stock_value(), None);
        assert_eq!(p.checked_revenue_for(2), None);
        assert_eq!(p.checked_revenue_for(1), Some(Decimal::MAX));
        assert_eq!(p.checked_cost_for(2), Some(dec!(2)));
        assert_eq!(p.stock_value(), Decimal::MAX);
    }

    #[test]
    fn test_sale_requires_positive_quantity() {
        let sale = Sale {
            id: SaleId(1),
            customer_id: CustomerId(1),
            product_id: ProductId(1),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity: 0,
            amount: None,
        };
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_age_counts_completed_years() {
        let customer = Customer {
            id: CustomerId(1),
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            gender: Gender::Female,
            marital_status: MaritalStatus::Married,
            email: "ada@example.com".to_string(),
            country: "UK".to_string(),
            join_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        };
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), 29);
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), 30);
        assert_eq!(customer.full_name(), "Ada Byron");
    }
}
