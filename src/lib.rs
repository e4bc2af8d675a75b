pub mod calculator;
pub mod config;
pub mod market;
pub mod model;
pub mod order;
pub mod portfolio;
pub mod symbol;

pub type Price = f64;
pub type Shares = f64;
pub type Weight = f64;

pub use calculator::Calculator;
pub use config::Config;
pub use market::{Market, MarketPrice, PriceSelector, StaticMarket};
pub use model::{Model, ModelAsset, ModelError};
pub use order::{Order, OrderType, Side};
pub use portfolio::Portfolio;
pub use symbol::{Symbol, Symbols};
