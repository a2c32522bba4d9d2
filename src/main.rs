//! Bistro - Binary Entry Point
//!
//! Prints the menu and the order queue stored in the snapshot file named by
//! `BISTRO_DATA`. Orders are listed by total using the distribution sort.

use std::process::ExitCode;

use bistro::types::money::format_currency;
use bistro::{logging, Config, OrderSort, Restaurant};

fn main() -> ExitCode {
    logging::init();

    let config = Config::from_env();
    tracing::info!(path = %config.data_path.display(), buckets = config.bucket_count, "opening snapshot");

    let restaurant = match Restaurant::open(&config) {
        Ok(restaurant) => restaurant,
        Err(err) => {
            tracing::error!(%err, "cannot load snapshot");
            return ExitCode::FAILURE;
        }
    };

    println!("===========================================");
    println!("  Bistro - Menu");
    println!("===========================================");

    let menu = restaurant.menu();
    if menu.is_empty() {
        println!("  (no items)");
    } else {
        println!("{:<5} | {:<25} | {:>10} | {:>7}", "CODE", "NAME", "PRICE", "STOCK");
        println!("{:-<5}-+-{:-<25}-+-{:->10}-+-{:->7}", "", "", "", "");
        for item in menu {
            println!(
                "{:<5} | {:<25} | {:>10} | {:>7}",
                item.code,
                item.name,
                format_currency(item.price),
                item.stock
            );
        }
    }

    println!();
    println!("===========================================");
    println!("  Orders by total");
    println!("===========================================");

    let orders = restaurant.orders(None, OrderSort::Total);
    if orders.is_empty() {
        println!("  (no orders)");
    }
    for order in orders {
        println!(
            "#{:<4} {:<18} {:>10}  ({} units)",
            order.id,
            order.status,
            format_currency(order.total),
            order.item_count()
        );
        for line in &order.lines {
            let name = restaurant
                .item(line.item_code)
                .map_or_else(|| format!("code {}", line.item_code), |item| item.name.clone());
            println!("       - {} x{} ({})", name, line.quantity, format_currency(line.unit_price));
        }
    }

    ExitCode::SUCCESS
}
