use super::common::*;
use crate::feedback::domain::{ResponseSubmission, Timeframe};

fn submission_at(score: i64, days_ago: i64) -> ResponseSubmission {
    ResponseSubmission {
        score: Some(score),
        submitted_at: Some(days_before(days_ago)),
        ..ResponseSubmission::default()
    }
}

#[test]
fn single_day_burst_yields_one_bucket_matching_the_direct_aggregate() {
    let (service, _) = setup();

    for score in [10, 9, 7, 2] {
        service
            .ingest_response(&survey_id(), &org(), submission_at(score, 2))
            .expect("ingest succeeds");
    }

    let series = service
        .trend(&org(), Timeframe::Week, base_time())
        .expect("trend readable");

    assert_eq!(series.len(), 1, "empty buckets are omitted");
    let bucket = &series[0];
    assert_eq!(bucket.bucket, days_before(2).format("%Y-%m-%d").to_string());
    assert_eq!(bucket.responses, 4);
    assert_eq!(bucket.promoters, 2);
    assert_eq!(bucket.passives, 1);
    assert_eq!(bucket.detractors, 1);
    // (2 - 1) / 4 * 100 = 25
    assert_eq!(bucket.nps, 25);
}

#[test]
fn buckets_come_back_in_ascending_order() {
    let (service, _) = setup();

    // Deliberately ingest newest-first.
    for days_ago in [1, 5, 3] {
        service
            .ingest_response(&survey_id(), &org(), submission_at(9, days_ago))
            .expect("ingest succeeds");
    }

    let series = service
        .trend(&org(), Timeframe::Week, base_time())
        .expect("trend readable");
    let keys: Vec<&str> = series.iter().map(|bucket| bucket.bucket.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(series.len(), 3);
}

#[test]
fn responses_outside_the_lookback_window_are_excluded() {
    let (service, _) = setup();

    service
        .ingest_response(&survey_id(), &org(), submission_at(10, 10))
        .expect("old ingest");
    service
        .ingest_response(&survey_id(), &org(), submission_at(3, 1))
        .expect("recent ingest");

    let series = service
        .trend(&org(), Timeframe::Week, base_time())
        .expect("trend readable");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].detractors, 1);
    assert_eq!(series[0].promoters, 0);
}

#[test]
fn quarter_series_buckets_by_iso_week() {
    let (service, _) = setup();

    service
        .ingest_response(&survey_id(), &org(), submission_at(9, 0))
        .expect("ingest succeeds");

    let series = service
        .trend(&org(), Timeframe::Quarter, base_time())
        .expect("trend readable");
    assert_eq!(series.len(), 1);
    // base_time() is 2026-08-20, ISO week 34.
    assert_eq!(series[0].bucket, "2026-W34");
}

#[test]
fn year_series_buckets_by_calendar_month() {
    let (service, _) = setup();

    service
        .ingest_response(&survey_id(), &org(), submission_at(6, 40))
        .expect("ingest succeeds");
    service
        .ingest_response(&survey_id(), &org(), submission_at(9, 0))
        .expect("ingest succeeds");

    let series = service
        .trend(&org(), Timeframe::Year, base_time())
        .expect("trend readable");
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].bucket, "2026-07");
    assert_eq!(series[1].bucket, "2026-08");
}

#[test]
fn unclassified_only_buckets_report_zero_nps() {
    let (service, _) = setup();

    let submission = ResponseSubmission {
        feedback: Some("no score".to_string()),
        submitted_at: Some(days_before(1)),
        ..ResponseSubmission::default()
    };
    service
        .ingest_response(&survey_id(), &org(), submission)
        .expect("ingest succeeds");

    let series = service
        .trend(&org(), Timeframe::Week, base_time())
        .expect("trend readable");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].responses, 1);
    assert_eq!(series[0].nps, 0);
}

#[test]
fn trend_only_sees_the_requesting_organization() {
    let (service, _) = setup();

    service
        .ingest_response(&survey_id(), &org(), submission_at(9, 1))
        .expect("ingest succeeds");

    let series = service
        .trend(&other_org(), Timeframe::Week, base_time())
        .expect("trend readable");
    assert!(series.is_empty());
}
