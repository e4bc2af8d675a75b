use anyhow::Context;
use clap::{CommandFactory, Parser};
use tabled::{builder::Builder, settings::Style};
use tracing::info;
use tracing_subscriber::EnvFilter;

use modelfit::{Calculator, Config, Model, Portfolio, StaticMarket};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let opts = cli::Cli::parse();

    if let Some(shell) = opts.completions {
        clap_complete::generate(
            shell,
            &mut cli::Cli::command(),
            "modelfit",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let mut config = Config::resolve(opts.config.as_deref())?;
    if opts.whole_shares {
        config.support_fractional_share = false;
    }
    if let Some(slot_size) = opts.slot_size {
        config.slot_size = slot_size;
    }
    config.buying_price = opts.buy_price.unwrap_or(config.buying_price);
    config.selling_price = opts.sell_price.unwrap_or(config.selling_price);
    config.value_price = opts.value_price.unwrap_or(config.value_price);
    info!(?config, "using configuration");

    let Some(model_path) = opts.model.or_else(Config::default_model_path) else {
        anyhow::bail!("Failed to get model path");
    };
    let model = Model::load_from_file(&model_path)
        .with_context(|| format!("Failed to load model {model_path:?}"))?;
    let market_path = opts.market.context("Missing market prices")?;
    let market = StaticMarket::load_from_file(&market_path)?;
    let portfolio_path = opts.portfolio.context("Missing portfolio snapshot")?;
    let portfolio = Portfolio::load_from_file(&portfolio_path)?;

    let limit = opts.limit.unwrap_or(portfolio.cash_amount());
    let calculator = Calculator::new(config)?;
    let orders = calculator.calculate_orders(&market, &model, &portfolio, limit);
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&orders)?);
        return Ok(());
    }

    println!("Model Target Allocations");
    let mut builder = Builder::default();
    builder.push_record(["Symbol", "Target", "Equivalents"]);
    for (symbol, asset) in model.assets() {
        let equivalents: Vec<&str> = asset.equivalents.iter().map(|e| e.as_str()).collect();
        builder.push_record([
            symbol.to_string(),
            format!("{:.1}%", model.target_proportion(symbol) * 100.0),
            equivalents.join(", "),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!();

    let value_price = calculator.config().value_price;
    let normalized = portfolio
        .aggregate_equivalents(&market, &model, value_price)
        .select(&model.symbols());
    let total = normalized.total_value(&market, value_price);
    println!("Current Allocations (cash ${:.2})", portfolio.cash_amount());
    let mut builder = Builder::default();
    builder.push_record(["Symbol", "Position", "Value", "Share"]);
    let mut positions: Vec<_> = normalized.positions().collect();
    positions.sort_by(|a, b| a.0.cmp(b.0));
    for (symbol, position) in positions {
        let value = position * value_price.price(&market, symbol);
        builder.push_record([
            symbol.to_string(),
            format!("{position:.4}"),
            format!("${value:.2}"),
            match total > 0.0 {
                true => format!("{:.2}%", value / total * 100.0),
                false => "-".to_string(),
            },
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!();

    if orders.is_empty() {
        println!("The portfolio already matches the model, no orders necessary.");
        return Ok(());
    }
    println!("In order to match the model spending at most ${limit:.2}, place these orders:");
    let mut builder = Builder::default();
    builder.push_record(["Symbol", "Side", "Type", "Amount", "Limit", "Value"]);
    for order in &orders {
        builder.push_record([
            order.symbol.to_string(),
            order.side.to_string(),
            order.order_type.to_string(),
            format!("{}", order.amount),
            format!("${:.2}", order.limit_price),
            format!("${:.2}", order.value()),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    Ok(())
}
