use std::fmt;

use derive_more::Display;
use serde::Serialize;

use crate::{Price, Shares, symbol::Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[display("LIMIT")]
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[display("BUY")]
    Buy,
    #[display("SELL")]
    Sell,
}

/// An order proposed by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub symbol: Symbol,
    pub order_type: OrderType,
    pub side: Side,
    pub amount: Shares,
    pub limit_price: Price,
}

impl Order {
    pub fn limit(symbol: Symbol, side: Side, amount: Shares, limit_price: Price) -> Self {
        Self {
            symbol,
            order_type: OrderType::Limit,
            side,
            amount,
            limit_price,
        }
    }

    pub fn value(&self) -> Price {
        self.amount * self.limit_price
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {:.2} {}",
            self.side, self.amount, self.symbol, self.limit_price, self.order_type
        )
    }
}
