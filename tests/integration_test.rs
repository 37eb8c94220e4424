mod helpers;

use helpers::*;
use revop_rms::config::PricingConfig;
use revop_rms::models::*;
use revop_rms::pricing::{AdvisorError, RuleBasedAdvisor};
use revop_rms::repositories::*;
use revop_rms::services::*;
use revop_rms::AppError;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Notify;

/// Optimise → apply all → only the suggested dates change
#[tokio::test]
async fn test_apply_all_touches_exactly_suggested_dates() {
    let (series, competitors) = long_fixture(10);
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let suggested = [2, 4, 6, 8, 10];
    let advisor = Arc::new(StubAdvisor::new(vec![Step::ok(
        suggested
            .iter()
            .map(|day| suggestion(*day, 6000 + *day as i64, DemandLevel::High))
            .collect(),
    )]));
    let service = loaded_service(store.clone(), advisor).await;
    let before = store.fetch_series().await.unwrap();

    let status = service.request_suggestions(None).await;
    assert!(matches!(status, SuggestionStatus::Ready { .. }));
    assert_eq!(service.suggestions().await.len(), 5);

    let report = service.apply_all().await;
    assert!(report.is_complete());
    assert_eq!(report.applied.len(), 5);
    assert!(report.already_applied.is_empty());

    let after = store.fetch_series().await.unwrap();
    let changed: BTreeSet<_> = suggested.iter().map(|day| date(*day)).collect();
    for (old, new) in before.iter().zip(&after) {
        if changed.contains(&new.date) {
            let day = (new.date - date(1)).num_days() + 1;
            assert_eq!(new.adr(), dec(6000 + day));
            assert_eq!(
                new.revpar(),
                round_half_up(new.adr() * new.occupancy() / Decimal::ONE_HUNDRED)
            );
            assert_eq!(new.competitor_rates(), old.competitor_rates());
        } else {
            assert_eq!(
                serde_json::to_string(old).unwrap(),
                serde_json::to_string(new).unwrap()
            );
        }
    }

    assert_eq!(service.series().await, after);
    assert!(service.suggestions().await.iter().all(|t| t.applied));

    // A second bulk apply is a no-op
    let again = service.apply_all().await;
    assert!(again.applied.is_empty());
    assert_eq!(again.already_applied.len(), 5);
    assert_eq!(store.fetch_series().await.unwrap(), after);
}

#[tokio::test]
async fn test_apply_single_suggestion_is_idempotent() {
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let service = loaded_service(store.clone(), Arc::new(RuleBasedAdvisor::new())).await;

    service.request_suggestions(Some("Mumbai")).await;
    let held = service.suggestions().await;
    assert_eq!(held.len(), 3);
    let first = held[0].suggestion.clone();
    // 90% occupancy is High: 4500 * 1.25
    assert_eq!(first.recommended_price, dec(5625));
    assert_eq!(first.current_price, dec(5000));

    let outcome = service.apply_suggestion(first.date).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied);
    let once = store.fetch_series().await.unwrap();
    assert_eq!(once[0].adr(), dec(5625));
    assert_eq!(once[0].revpar(), dec(5063));

    let outcome = service.apply_suggestion(first.date).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::AlreadyApplied);
    assert_eq!(store.fetch_series().await.unwrap(), once);

    let missing = service.apply_suggestion(date(30)).await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_store_failure_leaves_series_unchanged() {
    let (series, competitors) = long_fixture(5);
    let store = Arc::new(FailingStore::new(series, competitors));
    store.fail_on(date(3));
    let advisor = Arc::new(StubAdvisor::new(vec![Step::ok(vec![
        suggestion(2, 7000, DemandLevel::High),
        suggestion(3, 7000, DemandLevel::High),
        suggestion(4, 7000, DemandLevel::High),
    ])]));
    let service = loaded_service(store.clone(), advisor).await;

    let series_before = service.series().await;
    let metrics_before = service.metrics().await;

    let err = service.update_rate(date(3), dec(9000)).await.unwrap_err();
    assert!(err.is_store_failure());
    assert_eq!(service.series().await, series_before);
    assert_eq!(service.metrics().await, metrics_before);

    service.request_suggestions(None).await;
    let report = service.apply_all().await;

    assert_eq!(report.applied, vec![date(2), date(4)]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, date(3));
    assert!(!report.is_complete());

    let held = service.suggestions().await;
    assert!(held[0].applied);
    assert!(!held[1].applied);
    assert!(held[2].applied);

    let series = service.series().await;
    assert_eq!(series[2], series_before[2]);
    assert_eq!(series[1].adr(), dec(7000));
    assert!(service.apply_suggestion(date(3)).await.is_err());
}

#[tokio::test]
async fn test_advisor_failure_degrades_to_unavailable() {
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let advisor = Arc::new(StubAdvisor::new(vec![
        Step::fail(AdvisorError::Timeout),
        Step::ok(vec![suggestion(1, 5200, DemandLevel::Medium)]),
    ]));
    let service = loaded_service(store, advisor.clone()).await;

    assert_eq!(service.status().await, SuggestionStatus::NotRequested);
    let series_before = service.series().await;
    let metrics_before = service.metrics().await;

    let status = service.request_suggestions(None).await;
    assert!(status.is_unavailable());
    assert!(service.suggestions().await.is_empty());
    assert_eq!(service.series().await, series_before);
    assert_eq!(service.metrics().await, metrics_before);

    // A retry recovers
    let status = service.request_suggestions(None).await;
    assert!(matches!(status, SuggestionStatus::Ready { .. }));
    assert_eq!(service.suggestions().await.len(), 1);
    assert_eq!(advisor.calls(), 2);
}

#[tokio::test]
async fn test_invalid_advisor_items_are_dropped() {
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let mut blank = suggestion(2, 4100, DemandLevel::Medium);
    blank.reason = "   ".into();
    let advisor = Arc::new(StubAdvisor::new(vec![Step::ok(vec![
        suggestion(1, 5200, DemandLevel::Medium),
        suggestion(1, 5300, DemandLevel::Medium),
        blank,
        suggestion(3, 0, DemandLevel::Low),
        suggestion(25, 5000, DemandLevel::Medium),
    ])]));
    let service = loaded_service(store, advisor).await;

    service.request_suggestions(None).await;
    let held = service.suggestions().await;

    assert_eq!(held.len(), 1);
    assert_eq!(held[0].suggestion.recommended_price, dec(5200));
    // Current price is taken from the series, not the advisor
    assert_eq!(held[0].suggestion.current_price, dec(5000));
}

#[tokio::test]
async fn test_superseded_request_is_discarded() {
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let advisor = Arc::new(StubAdvisor::new(vec![
        Step::ok(vec![suggestion(1, 9999, DemandLevel::Extreme)])
            .held(entered.clone(), release.clone()),
        Step::ok(vec![suggestion(2, 4300, DemandLevel::Medium)]),
    ]));
    let service = Arc::new(loaded_service(store, advisor).await);

    let slow = {
        let service = service.clone();
        tokio::spawn(async move { service.request_suggestions(Some("Pune")).await })
    };

    entered.notified().await;
    assert!(service.status().await.is_pending());

    let fresh = service.request_suggestions(Some("Goa")).await;
    assert!(matches!(fresh, SuggestionStatus::Ready { .. }));

    release.notify_one();
    let stale = slow.await.unwrap();
    assert_eq!(stale, fresh);

    let held = service.suggestions().await;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].suggestion.date, date(2));
    assert_eq!(service.status().await, fresh);
}

#[tokio::test]
async fn test_edits_proceed_while_suggestions_pending() {
    let (series, competitors) = three_day_fixture();
    let competitor_id = competitors[0].id.clone();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let step = Step::ok(vec![suggestion(1, 5500, DemandLevel::High)])
        .held(entered.clone(), release.clone());
    let advisor = Arc::new(StubAdvisor::new(vec![step]));
    let service = Arc::new(loaded_service(store.clone(), advisor).await);

    let pending = {
        let service = service.clone();
        tokio::spawn(async move { service.request_suggestions(None).await })
    };
    entered.notified().await;

    let timeout = std::time::Duration::from_secs(5);
    let edit = service.update_competitor_rate(date(2), &competitor_id, dec(4400));
    tokio::time::timeout(timeout, edit)
        .await
        .expect("competitor rate edit blocked by pending request")
        .unwrap();
    tokio::time::timeout(timeout, service.update_rate(date(1), dec(5100)))
        .await
        .expect("rate edit blocked by pending request")
        .unwrap();

    assert!(service.status().await.is_pending());
    let cached = service.series().await;
    assert_eq!(cached[0].adr(), dec(5100));
    assert_eq!(cached[1].competitor_rate(), dec(4400));
    assert_eq!(store.fetch_series().await.unwrap(), cached);

    release.notify_one();
    let status = pending.await.unwrap();
    assert!(matches!(status, SuggestionStatus::Ready { .. }));

    // The suggestion is checked against the edited series
    let held = service.suggestions().await;
    assert_eq!(held[0].suggestion.current_price, dec(5100));
}

#[tokio::test]
async fn test_out_of_range_suggestion_never_reaches_store() {
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let mut huge = suggestion(1, 1, DemandLevel::Extreme);
    huge.recommended_price = Decimal::from_str_exact("1000000000000000000000000000").unwrap();
    let advisor = Arc::new(StubAdvisor::new(vec![Step::ok(vec![
        huge,
        suggestion(2, 4300, DemandLevel::Medium),
    ])]));
    let service = loaded_service(store.clone(), advisor).await;
    let before = store.fetch_series().await.unwrap();

    service.request_suggestions(None).await;
    let held = service.suggestions().await;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].suggestion.date, date(2));

    let err = service.apply_suggestion(date(1)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.fetch_series().await.unwrap(), before);

    // A direct edit at that magnitude is refused as well
    let huge_rate = Decimal::from_str_exact("1000000000000000000000000000").unwrap();
    let err = service.update_rate(date(1), huge_rate).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(service.series().await, before);
}

#[tokio::test]
async fn test_load_seeds_empty_store() {
    let store = Arc::new(InMemorySeriesStore::new());
    let service = RevenueService::new(
        store.clone(),
        Arc::new(RuleBasedAdvisor::new()),
        PricingConfig::default(),
    );

    let summary = service
        .load_with(date(1), &mut rand::SeedableRng::seed_from_u64(5))
        .await
        .unwrap();
    assert!(summary.seeded_competitors);
    assert!(summary.seeded_series);
    assert_eq!(summary.days, 30);

    let competitors = store.fetch_competitors().await.unwrap();
    let names: Vec<_> = competitors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Grand Hotel Mumbai", "City Stay Inn", "Seaside Resort"]);
    assert_eq!(store.fetch_series().await.unwrap().len(), 30);
    assert!(service.market_position().await.is_some());

    let summary = service.load().await.unwrap();
    assert!(!summary.seeded_series);
    assert!(!summary.seeded_competitors);
}

#[tokio::test]
async fn test_removing_compset_keeps_orphaned_rates() {
    let (series, competitors) = three_day_fixture();
    let removed = competitors[0].id.clone();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let service = loaded_service(store, Arc::new(RuleBasedAdvisor::new())).await;
    let metrics_before = service.metrics().await;

    assert!(service.market_position().await.is_some());
    service.remove_competitor(&removed).await.unwrap();

    assert!(service.market_position().await.is_none());
    assert_eq!(service.metrics().await, metrics_before);

    let series = service.series().await;
    assert!(series[0].competitor_rates().contains_key(&removed));
    assert_eq!(series[0].competitor_rate(), dec(4500));

    assert!(service.remove_competitor(&removed).await.unwrap_err().is_not_found());
    let err = service
        .update_competitor_rate(date(1), &removed, dec(100))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_competitor_rate_edit_recomputes_market_average() {
    let (series, competitors) = long_fixture(3);
    let target = competitors[0].id.clone();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let service = loaded_service(store.clone(), Arc::new(RuleBasedAdvisor::new())).await;

    // Day 1: my rate 4050, competitors 3750 and 4250
    service
        .update_competitor_rate(date(1), &target, dec(4150))
        .await
        .unwrap();

    let cached = service.series().await;
    assert_eq!(cached[0].competitor_rate(), dec(4200));
    assert_eq!(cached[0].adr(), dec(4050));
    assert_eq!(store.fetch_series().await.unwrap()[0], cached[0]);
    assert_eq!(cached[1].competitor_rate(), dec(4050));
}

#[tokio::test]
async fn test_rate_changes_are_audited() {
    let dir = std::env::temp_dir().join(format!("revop-it-{}", uuid::Uuid::new_v4()));
    let audit = Arc::new(AuditTrailService::new(dir.clone()).unwrap());
    let (series, competitors) = three_day_fixture();
    let store = Arc::new(InMemorySeriesStore::with_data(series, competitors));
    let suggestions = vec![suggestion(2, 4400, DemandLevel::Medium)];
    let advisor = Arc::new(StubAdvisor::new(vec![Step::ok(suggestions)]));
    let service =
        RevenueService::new(store, advisor, PricingConfig::default()).with_audit(audit.clone());
    service
        .load_with(date(1), &mut rand::SeedableRng::seed_from_u64(1))
        .await
        .unwrap();

    service.update_rate(date(1), dec(5100)).await.unwrap();
    service.request_suggestions(None).await;
    service.apply_suggestion(date(2)).await.unwrap();

    let contents = std::fs::read_to_string(audit.log_file()).unwrap();
    let entries: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "rate_update");
    assert_eq!(entries[0]["details"]["old_rate"], "5000");
    assert_eq!(entries[0]["details"]["source"], "manual");
    assert_eq!(entries[1]["details"]["new_rate"], "4400");
    assert_eq!(entries[1]["details"]["source"], "suggestion");

    std::fs::remove_dir_all(dir).ok();
}
