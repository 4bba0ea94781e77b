use crate::error::{GalleryError, Result};
use crate::models::{Month, Season};
use chrono::Datelike;

impl Month {
    pub fn season(&self) -> Season {
        match self {
            Month::December | Month::January | Month::February => Season::Winter,
            Month::March | Month::April | Month::May => Season::Spring,
            Month::June | Month::July | Month::August => Season::Summer,
            Month::September | Month::October | Month::November => Season::Autumn,
        }
    }
}

impl Season {
    /// Months of the season in folder order (winter starts with December).
    pub fn months(&self) -> [Month; 3] {
        match self {
            Season::Winter => [Month::December, Month::January, Month::February],
            Season::Spring => [Month::March, Month::April, Month::May],
            Season::Summer => [Month::June, Month::July, Month::August],
            Season::Autumn => [Month::September, Month::October, Month::November],
        }
    }
}

pub fn classify<T: Datelike>(timestamp: &T) -> (Season, Month) {
    // month() is always 1..=12
    let month = Month::ALL[timestamp.month0() as usize];
    (month.season(), month)
}

/// Combine a drop target with the date-based default.
///
/// A month alone implies its season. A season alone keeps the current month
/// when it belongs to that season and falls back to the season's first month
/// otherwise, so the stored pair is always one of the twelve valid ones.
pub fn resolve<T: Datelike>(
    timestamp: &T,
    season: Option<Season>,
    month: Option<Month>,
) -> Result<(Season, Month)> {
    match (season, month) {
        (None, None) => Ok(classify(timestamp)),
        (None, Some(m)) => Ok((m.season(), m)),
        (Some(s), Some(m)) if m.season() == s => Ok((s, m)),
        (Some(s), Some(m)) => Err(GalleryError::InvalidTarget {
            season: s.to_string(),
            month: m.to_string(),
        }),
        (Some(s), None) => {
            let (current_season, current_month) = classify(timestamp);
            if current_season == s {
                Ok((s, current_month))
            } else {
                Ok((s, s.months()[0]))
            }
        }
    }
}
