use std::{env, fs, path::Path};

use ts_rs::TS;

fn generate_types_content() -> String {
    let decls = [
        db::models::product::Attribute::decl(),
        db::models::product::AttributeSet::decl(),
        db::models::product::Product::decl(),
        db::models::cart::SelectedAttributes::decl(),
        db::models::cart::CartItem::decl(),
        db::models::cart::CartItemWithProduct::decl(),
        db::models::cart::AddToCart::decl(),
        db::models::address::Address::decl(),
        db::models::address::CreateAddress::decl(),
        db::models::address::UpdateAddress::decl(),
        db::models::dealer::DealerStatus::decl(),
        db::models::dealer::Dealer::decl(),
        db::models::dealer::CreateDealer::decl(),
        db::models::dealer::UpdateDealer::decl(),
        db::models::dealer::DealerFilter::decl(),
        db::models::order::OrderStatus::decl(),
        db::models::order::Order::decl(),
        db::models::order::OrderItem::decl(),
        db::models::order::OrderItemWithProduct::decl(),
        services::services::dialog_engine::DialogInput::decl(),
        services::services::dialog_engine::ResolutionOutcome::decl(),
        services::services::cart::UpdateCartItem::decl(),
        services::services::order::OrderLine::decl(),
        services::services::order::CreateOrder::decl(),
        services::services::order::CheckoutRequest::decl(),
        services::services::order::OrderCreated::decl(),
        services::services::order::OrderDetail::decl(),
        utils::response::ApiResponse::<()>::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|d| {
            let trimmed = d.trim_start();
            if trimmed.starts_with("export") {
                d
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `generate_types`. Do not edit it by hand.\n\n{body}\n"
    )
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let check_mode = args.iter().any(|arg| arg == "--check");

    let out_dir = Path::new("shared");
    let out_file = out_dir.join("types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&out_file).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            std::process::exit(0);
        }
        eprintln!("shared/types.ts is out of date. Run `cargo run --bin generate_types`.");
        std::process::exit(1);
    }

    if let Err(e) = fs::create_dir_all(out_dir).and_then(|_| fs::write(&out_file, generated)) {
        eprintln!("failed to write {}: {e}", out_file.display());
        std::process::exit(1);
    }
    println!("Wrote {}", out_file.display());
}
