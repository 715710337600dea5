//! Record builders shared by the unit tests.

use chrono::NaiveDate;
use core_types::{
    Customer, CustomerId, Gender, MaritalStatus, Product, ProductId, Sale, SaleId,
};
use rust_decimal::Decimal;

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn customer(id: u32, country: &str, join_date: NaiveDate) -> Customer {
    Customer {
        id: CustomerId(id),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        gender: Gender::Unknown,
        marital_status: MaritalStatus::Unknown,
        email: format!("customer{id}@example.com"),
        country: country.to_string(),
        join_date,
        birth_date: d(1990, 1, 1),
    }
}

pub fn product(id: u32, category: &str, price: Decimal, stock: u32) -> Product {
    Product {
        id: ProductId(id),
        name: format!("Product {id}"),
        category: category.to_string(),
        price,
        cost: Decimal::ZERO,
        stock,
    }
}

pub fn sale(
    id: u32,
    customer_id: u32,
    product_id: u32,
    order_date: NaiveDate,
    quantity: u32,
) -> Sale {
    Sale {
        id: SaleId(id),
        customer_id: CustomerId(customer_id),
        product_id: ProductId(product_id),
        order_date,
        quantity,
        amount: None,
    }
}
