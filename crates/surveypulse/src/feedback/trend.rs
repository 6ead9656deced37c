//! Time-bucketed NPS series for trend charts. Read path only: buckets are
//! derived from the raw response set on every call and never written back.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};

use super::domain::{ResponseRecord, Segment, Timeframe, TrendBucket};
use super::scoring;

/// Bucket granularity implied by the reporting timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BucketGranularity {
    Day,
    IsoWeek,
    Month,
}

impl Timeframe {
    pub(crate) const fn granularity(self) -> BucketGranularity {
        match self {
            Timeframe::Week | Timeframe::Month => BucketGranularity::Day,
            Timeframe::Quarter => BucketGranularity::IsoWeek,
            Timeframe::Year => BucketGranularity::Month,
        }
    }

    pub(crate) fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.lookback_days())
    }
}

/// Key a timestamp into its bucket. Keys sort lexicographically in time
/// order within a granularity, which keeps the series ordered via BTreeMap.
pub(crate) fn bucket_key(at: DateTime<Utc>, granularity: BucketGranularity) -> String {
    let date = at.date_naive();
    match granularity {
        BucketGranularity::Day => date.format("%Y-%m-%d").to_string(),
        BucketGranularity::IsoWeek => {
            let week = date.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        BucketGranularity::Month => date.format("%Y-%m").to_string(),
    }
}

#[derive(Default)]
struct BucketAccumulator {
    responses: u64,
    promoters: u64,
    passives: u64,
    detractors: u64,
}

/// Fold completed responses into an ascending series of non-empty buckets.
/// Each bucket's NPS uses the classified-only denominator and reports 0 when
/// the bucket holds no classified responses.
pub(crate) fn bucket_series(
    responses: &[ResponseRecord],
    timeframe: Timeframe,
) -> Vec<TrendBucket> {
    let granularity = timeframe.granularity();
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();

    for response in responses {
        let entry = buckets
            .entry(bucket_key(response.created_at, granularity))
            .or_default();
        entry.responses += 1;
        match response.segment {
            Some(Segment::Promoter) => entry.promoters += 1,
            Some(Segment::Passive) => entry.passives += 1,
            Some(Segment::Detractor) => entry.detractors += 1,
            None => {}
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, accumulator)| TrendBucket {
            bucket,
            nps: scoring::nps_score(
                accumulator.promoters,
                accumulator.passives,
                accumulator.detractors,
            )
            .unwrap_or(0),
            responses: accumulator.responses,
            promoters: accumulator.promoters,
            passives: accumulator.passives,
            detractors: accumulator.detractors,
        })
        .collect()
}
