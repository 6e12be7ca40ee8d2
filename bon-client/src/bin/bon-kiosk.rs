//! bon-kiosk: command-line front end over the client core
//!
//! Usage:
//!   bon-kiosk menu [category]
//!   bon-kiosk my-orders
//!   bon-kiosk watch
//!   bon-kiosk redirect <url>
//!   bon-kiosk board <cashier|queue|kitchen|admin>
//!   bon-kiosk dashboard [day|week|month|year]

use anyhow::{Context, bail};
use bon_client::boards;
use bon_client::dashboard::{Period, SalesReport};
use bon_client::logger::init_logger;
use bon_client::menu::{self, Category};
use bon_client::preferences::Screen;
use bon_client::projector::{StageModel, project_status, status_message};
use bon_client::{ApiClient, ClientConfig, InstitutionApi, MenuApi, OrderApi, Session};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载配置 (.env + 环境变量)
    let config = ClientConfig::from_env();
    config.validate()?;

    // 2. 初始化日志
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    tracing::info!(api_url = %config.api_url, "bon-kiosk starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("menu");
    let arg = args.get(1).map(String::as_str);

    let api = ApiClient::from_config(&config)?;
    let session = Session::open(config.clone())?;

    match command {
        "menu" => show_menu(&api, arg).await?,
        "my-orders" => {
            let report = session.tracker().refresh().await;
            print_my_orders(&report.orders);
            if !report.failed.is_empty() {
                eprintln!("{} order(s) could not be fetched", report.failed.len());
            }
        }
        "watch" => {
            let poller = session.watch_my_orders(|report| print_my_orders(&report.orders));
            tokio::signal::ctrl_c().await?;
            poller.shutdown().await;
        }
        "redirect" => {
            let raw = arg.context("redirect needs the landing URL")?;
            let location = Url::parse(raw).context("invalid redirect URL")?;
            let outcome = session.handle_redirect(&location).await;
            if let Some(notice) = outcome.notice() {
                eprintln!("{notice}");
            }
            if outcome.should_replace_location() {
                println!("{}", bon_client::reconciler::clean_location(&location));
            }
        }
        "board" => {
            let screen = match arg.unwrap_or("cashier") {
                "cashier" => Screen::Cashier,
                "queue" => Screen::Queue,
                "kitchen" => Screen::Kitchen,
                "admin" => Screen::AdminOrders,
                other => bail!("unknown board: {other}"),
            };
            show_board(&api, &session, screen).await?;
        }
        "dashboard" => {
            let period: Period = arg.and_then(|p| p.parse().ok()).unwrap_or_default();
            let orders = api.list_orders(None).await?;
            let institutions = api.list_institutions().await?;
            let report = SalesReport::build(&orders, &institutions, period, chrono::Local::now());
            print_report(&report);
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}

async fn show_menu(api: &ApiClient, category: Option<&str>) -> anyhow::Result<()> {
    let category = match category {
        Some(name) => Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(name))
            .with_context(|| format!("unknown category: {name}"))?,
        None => Category::All,
    };
    let drinks = api.list_drinks().await?;
    for drink in menu::filter_menu(&drinks, category) {
        println!("{:<30} {:>8} EGP", drink.title, menu::base_price(drink));
    }
    Ok(())
}

fn print_my_orders(orders: &[bon_client::Order]) {
    for order in orders {
        let state = project_status(order, StageModel::default());
        let message = status_message(&order.status).unwrap_or_default();
        println!(
            "#{:<6} {:<18} {:>3.0}%  {}",
            order.order_number,
            order.status,
            state.progress_fraction() * 100.0,
            message
        );
    }
}

async fn show_board(api: &ApiClient, session: &Session, screen: Screen) -> anyhow::Result<()> {
    let selection = session.preferences().branch(screen);
    if !selection.is_selected() && screen != Screen::Kitchen {
        bail!("no branch selected for this screen");
    }
    let orders = api.list_orders(selection.institution_id.as_deref()).await?;

    match screen {
        Screen::Queue => {
            let board = boards::queue_board(&orders);
            println!("Preparing: {}", board.preparing.join(", "));
            println!("Ready:     {}", board.ready.join(", "));
        }
        Screen::Cashier => {
            for order in boards::cashier_queue(&orders) {
                println!("#{:<6} {:>8} EGP", order.order_number, order.total_price);
            }
        }
        Screen::Kitchen => {
            for order in boards::kitchen_orders(&orders) {
                let action = boards::next_action_label(&order.status).unwrap_or("-");
                println!("#{:<6} {:<12} {}", order.order_number, order.status, action);
            }
        }
        Screen::AdminOrders => {
            for order in boards::admin_orders(&orders) {
                println!("#{:<6} {:<18} {:>8} EGP", order.order_number, order.status, order.total_price);
            }
        }
    }
    Ok(())
}

fn print_report(report: &SalesReport) {
    println!("{} ({} .. {})", report.period.label(), report.start, report.end);
    println!(
        "Revenue {} EGP, {} orders, average {} EGP",
        report.total_revenue,
        report.total_orders,
        report.average_order_value()
    );
    for branch in &report.institutions {
        println!(
            "  {:<24} {:>10} EGP  {:>4} orders",
            branch.institution.name, branch.revenue, branch.orders_count
        );
    }
    for drink in &report.top_drinks {
        println!("  * {:<22} {:>10} EGP  x{}", drink.name, drink.revenue, drink.quantity);
    }
}
