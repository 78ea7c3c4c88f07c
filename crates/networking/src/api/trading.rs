//! Order conversions with validation

use super::{inst_id, OrderData, PlaceOrderAck, PlaceOrderBody};
use liquidator_core::{Error, OrderRequest, OrderResult, OrderStatus, Price, Quantity, Result};
use tracing::warn;

/// Build the body for a spot cash IOC sell.
///
/// The size is truncated to `size_decimals` so the venue never sees more
/// than the account holds after rounding.
pub fn order_body(request: &OrderRequest, size_decimals: u32) -> Result<PlaceOrderBody> {
    if request.price.as_f64() <= 0.0 {
        return Err(Error::InvalidData("Order price must be positive".to_string()));
    }

    let size = request.quantity.truncated(size_decimals);
    if size.is_zero() {
        return Err(Error::InvalidData(format!(
            "Order size {} truncates to zero at {} decimals",
            request.quantity, size_decimals
        )));
    }

    if size != request.quantity {
        warn!(
            "Truncated order size from {} to {} for {}",
            request.quantity, size, request.symbol
        );
    }

    Ok(PlaceOrderBody {
        inst_id: inst_id(&request.symbol),
        td_mode: "cash".to_string(),
        side: "sell".to_string(),
        ord_type: "ioc".to_string(),
        sz: size.to_string(),
        px: request.price.to_string(),
    })
}

/// Turn the placement acknowledgement into an order result
pub fn ack_from_wire(acks: Vec<PlaceOrderAck>, amount: Quantity) -> Result<OrderResult> {
    let ack = acks
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidData("empty order acknowledgement".to_string()))?;

    if ack.s_code != "0" || ack.ord_id.is_empty() {
        return Err(Error::OrderRejected(format!("sCode {}: {}", ack.s_code, ack.s_msg)));
    }

    Ok(OrderResult::acknowledged(ack.ord_id, amount))
}

/// Normalize an OKX order state
pub fn order_status(state: &str) -> OrderStatus {
    match state {
        "live" | "partially_filled" => OrderStatus::Open,
        "filled" => OrderStatus::Closed,
        "canceled" | "mmp_canceled" => OrderStatus::Canceled,
        other => OrderStatus::Other(other.to_string()),
    }
}

/// Convert order details into the domain result
pub fn order_from_wire(order: OrderData) -> OrderResult {
    let filled = order.acc_fill_sz.max(0.0);
    let remaining = (order.sz - filled).max(0.0);
    let average = order.avg_px.filter(|p| *p > 0.0).map(Price::new);
    let cost = average.map(|p| p.as_f64() * filled).unwrap_or(0.0);

    OrderResult {
        id: order.ord_id,
        status: order_status(&order.state),
        amount: Quantity::new(order.sz),
        filled: Quantity::new(filled),
        remaining: Quantity::new(remaining),
        average,
        cost,
    }
}
