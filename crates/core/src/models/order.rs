//! Order models

use crate::{MarketSymbol, Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immediate-or-cancel limit sell. Built fresh for every attempt and
/// never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: MarketSymbol,
    pub quantity: Quantity,
    /// Limit price; fills below it are never accepted
    pub price: Price,
}

impl OrderRequest {
    pub fn ioc_limit_sell(symbol: MarketSymbol, quantity: Quantity, price: Price) -> Self {
        Self {
            symbol,
            quantity,
            price,
        }
    }
}

/// Normalized order status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
    Other(String),
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => f.write_str("open"),
            OrderStatus::Closed => f.write_str("closed"),
            OrderStatus::Canceled => f.write_str("canceled"),
            OrderStatus::Other(status) => f.write_str(status),
        }
    }
}

/// Venue view of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Venue-assigned identifier
    pub id: String,
    pub status: OrderStatus,
    /// Originally requested size
    pub amount: Quantity,
    pub filled: Quantity,
    pub remaining: Quantity,
    /// Average fill price, absent when nothing filled
    pub average: Option<Price>,
    /// Total proceeds in quote currency
    pub cost: f64,
}

impl OrderResult {
    /// Acknowledgement for a freshly submitted order: nothing filled yet
    pub fn acknowledged(id: impl Into<String>, amount: Quantity) -> Self {
        Self {
            id: id.into(),
            status: OrderStatus::Open,
            amount,
            filled: Quantity::ZERO,
            remaining: amount,
            average: None,
            cost: 0.0,
        }
    }
}
