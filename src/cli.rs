use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use modelfit::PriceSelector;

#[derive(Parser, Debug)]
#[command(
    name = "modelfit",
    version,
    about = "Compute the orders that rebalance a portfolio toward a model"
)]
pub(crate) struct Cli {
    #[arg(
        required_unless_present = "completions",
        help = "Portfolio snapshot (YAML or JSON) with cash and positions"
    )]
    pub portfolio: Option<PathBuf>,
    #[arg(short, long, help = "Model definition (JSON or YAML)")]
    pub model: Option<PathBuf>,
    #[arg(
        long,
        required_unless_present = "completions",
        help = "Market prices CSV with Symbol,Last,Bid,Ask columns"
    )]
    pub market: Option<PathBuf>,
    #[arg(short, long, help = "Calculator configuration")]
    pub config: Option<PathBuf>,
    #[arg(short, long, help = "Maximum amount to spend, defaults to all available cash")]
    pub limit: Option<f64>,
    #[arg(long, help = "Only trade whole slots")]
    pub whole_shares: bool,
    #[arg(long, help = "Tradeable units per share when trading whole slots")]
    pub slot_size: Option<f64>,
    #[arg(long, value_enum, help = "Limit price for buy orders")]
    pub buy_price: Option<PriceSelector>,
    #[arg(long, value_enum, help = "Limit price for sell orders")]
    pub sell_price: Option<PriceSelector>,
    #[arg(long, value_enum, help = "Price used to value positions")]
    pub value_price: Option<PriceSelector>,
    #[arg(long, help = "Print the orders as JSON instead of tables")]
    pub json: bool,
    #[arg(long, value_enum, help = "Print shell completions and exit")]
    pub completions: Option<Shell>,
}
