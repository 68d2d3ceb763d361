use crate::infra::{seeded_directory, InMemoryNotificationPublisher};
use chrono::{Duration, Utc};
use clap::Args;
use std::sync::Arc;
use tender_market::error::AppError;
use tender_market::marketplace::{
    BudgetRange, ContractorId, InMemoryMarketplaceStore, LandlordId, MarketplaceError,
    MarketplaceService, Priority, PropertyId, QuoteBid, TenderDraft, TradeCategory,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Days until the demo tender's bidding deadline
    #[arg(long, default_value_t = 5)]
    pub(crate) deadline_days: i64,
    /// Skip the expiry sweep portion of the demo
    #[arg(long)]
    pub(crate) skip_expiry: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        deadline_days,
        skip_expiry,
    } = args;

    let now = Utc::now();
    let landlord = LandlordId("landlord-ashworth".to_string());
    let plumber = ContractorId("contractor-hale-plumbing".to_string());
    let handyman = ContractorId("contractor-mills-maintenance".to_string());

    let store = Arc::new(InMemoryMarketplaceStore::new());
    let directory = Arc::new(seeded_directory());
    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let service = MarketplaceService::new(store, directory, notifications.clone());

    println!("Tender marketplace demo");

    let tender = service
        .post_tender(
            TenderDraft {
                property_id: PropertyId("property-elm-road-12".to_string()),
                landlord_id: landlord.clone(),
                trade: TradeCategory::Plumbing,
                title: "Leaking kitchen tap".to_string(),
                description: "Steady drip under the sink, cabinet base swelling".to_string(),
                priority: Priority::High,
                budget: BudgetRange { min: 50, max: 150 },
                deadline: now + Duration::days(deadline_days),
            },
            now,
        )
        .map_err(AppError::from)?;
    println!(
        "- Posted tender {} ({}, {} priority, budget {}-{}, bidding closes {})",
        tender.id.0,
        tender.trade.display_name(),
        tender.priority.label(),
        tender.budget.min,
        tender.budget.max,
        tender.deadline.format("%Y-%m-%d %H:%M")
    );

    let board = service
        .open_tenders_for_contractor(&plumber, now)
        .map_err(AppError::from)?;
    println!(
        "- Bid board for {}: {} open tender(s)",
        plumber.0,
        board.len()
    );

    let first_bid = service
        .submit_quote(
            &tender.id,
            &plumber,
            QuoteBid {
                amount: 65,
                description: "Replace tap and check isolation valve".to_string(),
                estimated_hours: Some(2),
                materials_included: true,
                materials_cost: Some(25),
                available_from: (now + Duration::days(1)).date_naive(),
                warranty_days: 90,
            },
            now,
        )
        .map_err(AppError::from)?;
    let second_bid = service
        .submit_quote(
            &tender.id,
            &handyman,
            QuoteBid {
                amount: 180,
                description: "Full tap assembly swap, same-day".to_string(),
                estimated_hours: Some(3),
                materials_included: true,
                materials_cost: Some(60),
                available_from: now.date_naive(),
                warranty_days: 180,
            },
            now,
        )
        .map_err(AppError::from)?;
    println!(
        "- Collected quotes {} (65) and {} (180, over budget)",
        first_bid.id.0, second_bid.id.0
    );

    println!("\nLandlord review (ranked)");
    for view in service.rank_quotes(&tender.id).map_err(AppError::from)? {
        println!(
            "- {} | {} | amount {} | {} | warranty {} days",
            view.quote_id.0, view.status, view.amount, view.budget_fit, view.warranty_days
        );
    }

    let outcome = service
        .accept_quote(&tender.id, &first_bid.id, &landlord)
        .map_err(AppError::from)?;
    println!(
        "\nAccepted {} -> tender {} now {}; {} competing quote(s) rejected",
        outcome.accepted.id.0,
        outcome.tender.id.0,
        outcome.tender.status.label(),
        outcome.rejected.len()
    );

    match service.accept_quote(&tender.id, &second_bid.id, &landlord) {
        Err(MarketplaceError::InvalidState) => {
            println!("Repeat acceptance correctly refused: the tender is already assigned")
        }
        Ok(_) => println!("Unexpected: second acceptance committed"),
        Err(err) => println!("Repeat acceptance refused: {err}"),
    }

    if !skip_expiry {
        let stale = service
            .post_tender(
                TenderDraft {
                    property_id: PropertyId("property-kings-court-3".to_string()),
                    landlord_id: landlord.clone(),
                    trade: TradeCategory::Electrical,
                    title: "Flickering hallway lights".to_string(),
                    description: "Intermittent flicker on the landing circuit".to_string(),
                    priority: Priority::Low,
                    budget: BudgetRange { min: 40, max: 120 },
                    deadline: now - Duration::hours(1),
                },
                now - Duration::days(3),
            )
            .map_err(AppError::from)?;
        let expired = service
            .sweep_expired_tenders(now)
            .map_err(AppError::from)?;
        println!(
            "\nExpiry sweep closed {} tender(s), including {}",
            expired.len(),
            stale.id.0
        );
    }

    let events = notifications.events();
    if events.is_empty() {
        println!("\nNotifications: none dispatched");
    } else {
        println!("\nNotifications dispatched");
        for event in events {
            println!(
                "- {} -> {} (tender {})",
                event.kind.label(),
                event.recipient,
                event.tender_id.0
            );
        }
    }

    Ok(())
}
