use std::path::{Path, PathBuf};

use modelfit::{Calculator, Config, Model, Portfolio, PriceSelector, Side, StaticMarket, Symbol};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixture").join(name)
}

fn load() -> (StaticMarket, Model, Portfolio) {
    let market = StaticMarket::load_from_file(&fixture("market.csv")).unwrap();
    let model = Model::load_from_file(&fixture("model-core.json")).unwrap();
    let portfolio = Portfolio::load_from_file(&fixture("portfolio.yml")).unwrap();
    (market, model, portfolio)
}

#[test]
fn fixtures_load() {
    let (market, model, portfolio) = load();
    assert_eq!(market.len(), 16);
    assert_eq!(model.symbols().len(), 15);
    assert!(model.is_relevant(&"CSPX".into()));
    assert_eq!(portfolio.cash_amount(), 5000.0);
    assert_eq!(portfolio.symbols().len(), 16);

    let config = Config::load_from_file(&fixture("config.yml")).unwrap();
    assert!(!config.support_fractional_share);
    assert_eq!(config.value_price, PriceSelector::Bid);
}

#[test]
fn whole_share_orders_for_demo_portfolio() {
    let (market, model, portfolio) = load();
    let config = Config::load_from_file(&fixture("config.yml")).unwrap();
    let orders = Calculator::new(config)
        .unwrap()
        .calculate_orders(&market, &model, &portfolio, 5000.0);

    assert!(!orders.is_empty());
    assert!(orders.windows(2).all(|w| w[0].value() <= w[1].value()));
    let cspx = Symbol::from("CSPX");
    for order in &orders {
        assert_ne!(order.symbol, cspx);
        assert!(model.contains(&order.symbol));
        assert!(order.amount >= 1.0);
        assert_eq!(order.amount.fract(), 0.0);
        assert_eq!(
            order.limit_price,
            PriceSelector::Bid.price(&market, &order.symbol)
        );
    }
}

#[test]
fn fractional_orders_spend_the_limit() {
    let (market, model, portfolio) = load();
    let calculator = Calculator::new(Config {
        value_price: PriceSelector::Last,
        buying_price: PriceSelector::Last,
        selling_price: PriceSelector::Last,
        ..Config::default()
    })
    .unwrap();

    for limit in [0.0, 1200.0, 5000.0, 20_000.0] {
        let orders = calculator.calculate_orders(&market, &model, &portfolio, limit);
        let net: f64 = orders
            .iter()
            .map(|o| match o.side {
                Side::Buy => o.value(),
                Side::Sell => -o.value(),
            })
            .sum();
        let expected = limit.min(portfolio.cash_amount());
        assert!((net - expected).abs() < 1e-6, "limit {limit}: net {net}");
    }
}

#[test]
fn fractional_orders_reach_target_proportions() {
    let (market, model, portfolio) = load();
    let calculator = Calculator::new(Config::default()).unwrap();
    let orders = calculator.calculate_orders(&market, &model, &portfolio, 5000.0);

    let normalized = portfolio
        .aggregate_equivalents(&market, &model, PriceSelector::Last)
        .select(&model.symbols());
    let post_tav = normalized.total_value(&market, PriceSelector::Last) + 5000.0;
    for s in model.symbols().iter() {
        let delta = orders
            .iter()
            .find(|o| &o.symbol == s)
            .map_or(0.0, |o| match o.side {
                Side::Buy => o.amount,
                Side::Sell => -o.amount,
            });
        let value = (normalized.position(s) + delta) * PriceSelector::Last.price(&market, s);
        assert!((value - model.target_proportion(s) * post_tav).abs() < 1e-6);
    }
}
