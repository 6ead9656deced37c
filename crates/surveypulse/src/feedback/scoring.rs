//! Segment classification and NPS math. Pure functions, no failure modes:
//! insufficient data yields `None`, never a fabricated zero.

use super::domain::Segment;

impl Segment {
    /// Classify a pre-validated 0-10 score: 9-10 promoter, 7-8 passive,
    /// 0-6 detractor.
    pub const fn for_score(score: u8) -> Segment {
        match score {
            9..=u8::MAX => Segment::Promoter,
            7..=8 => Segment::Passive,
            _ => Segment::Detractor,
        }
    }
}

/// Classify an optional score; a missing score stays unclassified.
pub fn classify(score: Option<u8>) -> Option<Segment> {
    score.map(Segment::for_score)
}

/// Net Promoter Score over classified responses only:
/// `round(((promoters - detractors) / classified) * 100)`, ties away from
/// zero. `None` when nothing is classified.
pub fn nps_score(promoters: u64, passives: u64, detractors: u64) -> Option<i32> {
    let classified = promoters + passives + detractors;
    if classified == 0 {
        return None;
    }
    let raw = (promoters as f64 - detractors as f64) / classified as f64 * 100.0;
    Some(raw.round() as i32)
}

/// Funnel rate as a percentage rounded to one decimal place; 0 when nothing
/// was sent.
pub fn rate(count: u64, sent: u64) -> f64 {
    if sent == 0 {
        return 0.0;
    }
    (count as f64 / sent as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_integer_score() {
        for score in 0..=10u8 {
            let segment = Segment::for_score(score);
            match score {
                9 | 10 => assert_eq!(segment, Segment::Promoter, "score {score}"),
                7 | 8 => assert_eq!(segment, Segment::Passive, "score {score}"),
                _ => assert_eq!(segment, Segment::Detractor, "score {score}"),
            }
        }
    }

    #[test]
    fn missing_score_stays_unclassified() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some(10)), Some(Segment::Promoter));
    }

    #[test]
    fn nps_matches_reference_example() {
        // promoters=5, detractors=2 over 10 classified => 30
        assert_eq!(nps_score(5, 3, 2), Some(30));
    }

    #[test]
    fn nps_is_none_without_classified_responses() {
        assert_eq!(nps_score(0, 0, 0), None);
    }

    #[test]
    fn nps_rounds_ties_away_from_zero() {
        // (3 - 2) / 8 * 100 = 12.5 -> 13
        assert_eq!(nps_score(3, 3, 2), Some(13));
        // (2 - 3) / 8 * 100 = -12.5 -> -13
        assert_eq!(nps_score(2, 3, 3), Some(-13));
    }

    #[test]
    fn nps_spans_full_range() {
        assert_eq!(nps_score(4, 0, 0), Some(100));
        assert_eq!(nps_score(0, 0, 4), Some(-100));
    }

    #[test]
    fn rates_round_to_one_decimal() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 3), 33.3);
        assert_eq!(rate(2, 3), 66.7);
        assert_eq!(rate(3, 3), 100.0);
    }
}
