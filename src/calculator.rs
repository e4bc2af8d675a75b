use tracing::{debug, warn};

use crate::{
    Price, Shares,
    config::Config,
    market::Market,
    model::Model,
    order::{Order, Side},
    portfolio::Portfolio,
};

/// Computes the orders that move a portfolio toward a model.
#[derive(Debug, Clone)]
pub struct Calculator {
    config: Config,
}

impl Calculator {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        if config.buy_only {
            warn!("buy_only is set but sell orders are not filtered");
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Orders needed to spend up to `limit` (capped by cash) while bringing
    /// every model asset to its target proportion, sorted by ascending value.
    ///
    /// The model is assumed valid and to price every asset above zero;
    /// otherwise amounts come out non-finite.
    pub fn calculate_orders<M: Market + ?Sized>(
        &self,
        market: &M,
        model: &Model,
        portfolio: &Portfolio,
        limit: Price,
    ) -> Vec<Order> {
        let value_price = self.config.value_price;
        let portfolio = portfolio
            .aggregate_equivalents(market, model, value_price)
            .select(&model.symbols());

        let estimated_order_value = limit.min(portfolio.cash_amount());
        let pre_tav = portfolio.total_value(market, value_price);
        let post_tav = pre_tav + estimated_order_value;
        debug!(pre_tav, post_tav, estimated_order_value, "total asset value");

        let mut orders: Vec<Order> = model
            .symbols()
            .iter()
            .filter_map(|s| {
                let price = value_price.price(market, s);
                let current_value = price * portfolio.position(s);
                let delta = (model.target_proportion(s) * post_tav - current_value) / price;
                let amount = self.order_amount(delta);
                if amount == 0.0 {
                    debug!(%s, delta, "no order");
                    return None;
                }
                let (side, limit_price) = if delta > 0.0 {
                    (Side::Buy, self.config.buying_price.price(market, s))
                } else {
                    (Side::Sell, self.config.selling_price.price(market, s))
                };
                debug!(%s, delta, amount, %side, limit_price, "order");
                Some(Order::limit(s.clone(), side, amount, limit_price))
            })
            .collect();

        orders.sort_by(|a, b| a.value().total_cmp(&b.value()));
        debug!(?orders, "calculated orders");
        orders
    }

    /// Unsigned order size; whole slots are truncated toward zero.
    fn order_amount(&self, delta: Shares) -> Shares {
        if self.config.support_fractional_share {
            delta.abs()
        } else {
            let slot_size = self.config.slot_size;
            ((delta * slot_size).trunc() / slot_size).abs()
        }
    }
}
