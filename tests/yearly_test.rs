mod common;

use anyhow::Result;
use common::{Household, parse_datetime, spend, test_service};
use outlay::application::AppError;

#[tokio::test]
async fn test_monthly_totals_year_to_date() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let owner = service.create_owner("alice").await?;
    spend(&service, &owner, 1000, "food", "2024-01-15").await?;
    spend(&service, &owner, 500, "food", "2024-01-20").await?;
    spend(&service, &owner, 700, "rent", "2024-03-01").await?;

    let summary = service
        .year_to_date(owner.id, parse_datetime("2024-06-30 12:00:00"))
        .await?;

    let totals: Vec<_> = summary.iter().map(|m| (m.month, m.total)).collect();
    assert_eq!(
        totals,
        vec![
            ("January", 1500),
            ("February", 0),
            ("March", 700),
            ("April", 0),
            ("May", 0),
            ("June", 0),
            ("July", 0),
            ("August", 0),
            ("September", 0),
            ("October", 0),
            ("November", 0),
            ("December", 0),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_household_year_to_date() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let household = Household::create(&service).await?;

    let summary = service
        .year_to_date(household.alice.id, parse_datetime("2024-06-30"))
        .await?;
    assert_eq!(summary.total_for(1), Some(5700));
    assert_eq!(summary.total_for(2), Some(93000));
    assert_eq!(summary.total_for(3), Some(2500));
    // last year's travel falls outside the window
    assert_eq!(summary.total_for(12), Some(0));

    let summary = service
        .year_to_date(household.bob.id, parse_datetime("2024-06-30"))
        .await?;
    assert_eq!(summary.total_for(1), Some(9999));
    assert_eq!(summary.iter().map(|m| m.total).sum::<i64>(), 9999);
    Ok(())
}

#[tokio::test]
async fn test_window_ends_at_now() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let owner = service.create_owner("alice").await?;
    spend(&service, &owner, 100, "food", "2024-01-01").await?;
    spend(&service, &owner, 200, "food", "2024-03-10 08:00:00").await?;
    spend(&service, &owner, 400, "food", "2024-03-10 08:00:01").await?;

    let summary = service
        .year_to_date(owner.id, parse_datetime("2024-03-10 08:00:00"))
        .await?;
    assert_eq!(summary.total_for(1), Some(100));
    assert_eq!(summary.total_for(3), Some(200));
    Ok(())
}

#[tokio::test]
async fn test_owner_without_expenses_gets_twelve_zero_months() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let owner = service.create_owner("carol").await?;

    let summary = service
        .year_to_date(owner.id, parse_datetime("2024-12-31 23:59:59"))
        .await?;
    assert_eq!(summary.iter().count(), 12);
    assert!(summary.iter().all(|m| m.total == 0));
    Ok(())
}

#[tokio::test]
async fn test_month_total_too_large_is_an_error() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let owner = service.create_owner("alice").await?;
    spend(&service, &owner, i64::MAX, "yacht", "2024-04-01").await?;
    spend(&service, &owner, 1, "fuel", "2024-04-02").await?;

    let result = service
        .year_to_date(owner.id, parse_datetime("2024-06-30"))
        .await;
    assert!(matches!(result, Err(AppError::TotalOverflow(_))));
    Ok(())
}
