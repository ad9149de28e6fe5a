// Lookback statistics: nearest report, sufficiency, delta/rate ranking

mod common;

use common::report;
use nmtscope::dashboard::{
    LookbackInterval, RankStatus, SortCriteria, SortType, interval_options, is_sufficient,
    lookback_window, nearest_report, rank_categories,
};
use nmtscope::models::Report;

fn four_reports() -> Vec<Report> {
    vec![
        report(400, &[("Total", 1024)]),
        report(700, &[("Total", 2048)]),
        report(940, &[("Total", 3072)]),
        report(1000, &[("Total", 4096)]),
    ]
}

fn names(categories: &[&str]) -> Vec<String> {
    categories.iter().map(|c| c.to_string()).collect()
}

#[test]
fn five_minute_window_picks_exact_report() {
    let reports = four_reports();
    let window = lookback_window(&reports, 300).unwrap();
    assert_eq!(window.latest.created, 1000);
    assert_eq!(window.past.created, 700);
    assert_eq!(window.actual_interval, 300);
    assert!(window.is_sufficient(300));
}

#[test]
fn ten_minute_window_reaches_first_report() {
    let reports = four_reports();
    let window = lookback_window(&reports, 600).unwrap();
    assert_eq!(window.past.created, 400);
    assert_eq!(window.actual_interval, 600);
    assert!(is_sufficient(&reports, 600));
}

#[test]
fn window_longer_than_data_is_insufficient() {
    let reports = four_reports();
    // target = -2600, nearest = 400, actual = 600 < 3595
    assert!(!is_sufficient(&reports, 3600));
    assert!(!is_sufficient(&reports, 900));
}

#[test]
fn sufficiency_matches_actual_interval_for_every_lookback() {
    let reports = four_reports();
    for interval in LookbackInterval::ALL {
        let secs = interval.secs();
        let target = 1000 - secs;
        let past = nearest_report(&reports, target).unwrap();
        let expected = 1000 - past.created >= secs - 5;
        assert_eq!(is_sufficient(&reports, secs), expected, "interval {}", interval);
    }
}

#[test]
fn fewer_than_two_reports_is_never_sufficient() {
    let single = vec![report(1000, &[("Total", 1)])];
    let categories = names(&["Total", "GC"]);
    for interval in LookbackInterval::ALL {
        assert!(!is_sufficient(&single, interval.secs()));
        assert!(!is_sufficient(&[], interval.secs()));

        let ranking = rank_categories(
            &single,
            &categories,
            SortCriteria::Interval(interval),
            SortType::Delta,
        );
        assert_eq!(ranking.status, RankStatus::Insufficient(interval));
        assert!(ranking.items.iter().all(|i| i.delta.is_none() && i.rate.is_none()));
        assert_eq!(ranking.items.len(), 2);
    }
}

#[test]
fn unsorted_keeps_category_order_with_null_stats() {
    let reports = four_reports();
    let categories = names(&["Total", "GC", "Class"]);
    let ranking = rank_categories(&reports, &categories, SortCriteria::None, SortType::Rate);
    assert_eq!(ranking.status, RankStatus::Unsorted);
    let order: Vec<&str> = ranking.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(order, vec!["Total", "GC", "Class"]);
    assert!(ranking.items.iter().all(|i| i.delta.is_none()));
    assert_eq!(ranking.status_message(SortType::Rate), None);
}

#[test]
fn delta_converts_kb_to_mb_and_missing_counts_as_zero() {
    let reports = vec![
        report(0, &[("Total", 1024)]),
        report(60, &[("Total", 3072), ("Thread", 2048)]),
    ];
    let categories = names(&["Total", "Thread", "GC"]);
    let ranking = rank_categories(
        &reports,
        &categories,
        SortCriteria::Interval(LookbackInterval::Min1),
        SortType::Delta,
    );
    assert_eq!(ranking.status, RankStatus::Sorted);

    let by_name = |n: &str| ranking.items.iter().find(|i| i.name == n).unwrap().clone();
    assert_eq!(by_name("Total").delta, Some(2.0));
    assert_eq!(by_name("Thread").delta, Some(2.0));
    assert_eq!(by_name("GC").delta, Some(0.0));
    assert_eq!(by_name("GC").rate, Some(0.0));
    let rate = by_name("Total").rate.unwrap();
    assert!((rate - 2.0 / 60.0).abs() < 1e-12);
}

#[test]
fn delta_and_rate_orders_can_differ() {
    // GC grows 300 MB early and then stays flat; Thread grows 10 MB in the last 60 s.
    // Over 5m GC leads on delta; over 1m Thread leads on rate.
    let reports = vec![
        report(700, &[("GC", 0), ("Thread", 0)]),
        report(940, &[("GC", 300 * 1024), ("Thread", 0)]),
        report(1000, &[("GC", 300 * 1024), ("Thread", 10 * 1024)]),
    ];
    let categories = names(&["Thread", "GC"]);

    let by_delta = rank_categories(
        &reports,
        &categories,
        SortCriteria::Interval(LookbackInterval::Min5),
        SortType::Delta,
    );
    let order: Vec<&str> = by_delta.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(order, vec!["GC", "Thread"]);

    let by_rate = rank_categories(
        &reports,
        &categories,
        SortCriteria::Interval(LookbackInterval::Min1),
        SortType::Rate,
    );
    let order: Vec<&str> = by_rate.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(order, vec!["Thread", "GC"]);
}

#[test]
fn negative_growth_sorts_last_and_ties_keep_category_order() {
    let reports = vec![
        report(0, &[("A", 2048), ("B", 1024), ("C", 1024)]),
        report(300, &[("A", 1024), ("B", 2048), ("C", 2048)]),
    ];
    let categories = names(&["A", "B", "C"]);
    let ranking = rank_categories(
        &reports,
        &categories,
        SortCriteria::Interval(LookbackInterval::Min5),
        SortType::Rate,
    );
    let order: Vec<&str> = ranking.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(order, vec!["B", "C", "A"]);
}

#[test]
fn insufficient_status_message_names_interval() {
    let reports = four_reports();
    let ranking = rank_categories(
        &reports,
        &names(&["Total"]),
        SortCriteria::Interval(LookbackInterval::Min60),
        SortType::Delta,
    );
    assert_eq!(
        ranking.status_message(SortType::Delta).as_deref(),
        Some("Data insufficient for 60m interval. Displaying alphabetical order.")
    );
}

#[test]
fn sorted_status_message_depends_on_sort_type() {
    let reports = four_reports();
    let ranking = rank_categories(
        &reports,
        &names(&["Total"]),
        SortCriteria::Interval(LookbackInterval::Min5),
        SortType::Delta,
    );
    assert_eq!(
        ranking.status_message(SortType::Delta).as_deref(),
        Some("Categories sorted by absolute memory change.")
    );
    assert_eq!(
        ranking.status_message(SortType::Rate).as_deref(),
        Some("Categories sorted by change rate (MB/s).")
    );
}

#[test]
fn interval_options_disable_uncovered_intervals() {
    let reports = four_reports();
    let options = interval_options(&reports, SortType::Delta);
    assert_eq!(options.len(), 7);
    let enabled: Vec<&str> = options
        .iter()
        .filter(|o| o.enabled)
        .map(|o| o.interval.label())
        .collect();
    // 10s -> 1000 itself (0 < 5); 30s -> tie 940/1000, first wins (60 >= 25);
    // 1m -> 940; 5m -> 700; 15m and longer -> 400 (600 < 895)
    assert_eq!(enabled, vec!["30s", "1m", "5m"]);

    let fifteen = &options[4];
    assert_eq!(fifteen.title, "Data interval is less than 15m.");
    assert_eq!(options[3].title, "Sort by delta over the last 5m.");
    assert_eq!(options[3].label, "5m Delta (Largest First)");
}
