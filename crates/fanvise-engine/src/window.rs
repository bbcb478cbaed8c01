// Scoring window resolution from the current instant and league calendar.
//
// The active matchup period is the block of `matchup_length_days` containing
// the league-local date, aligned either to an explicit season start or, for
// weekly periods only, to the most recent `week_start` day. The window handed to the rest of the pipeline
// covers what is left of that period: from local midnight today (or the
// period start, if later) through the last second of the period.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};
use thiserror::Error;

use fanvise_core::config::CalendarConfig;
use fanvise_core::window::{ScoringWindow, WindowError};

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("invalid week start day: {0:?}")]
    InvalidWeekStart(String),
    #[error("matchup length must be at least one day")]
    ZeroLength,
    #[error("utc offset of {0} hours is out of range")]
    InvalidOffset(i32),
    #[error("a {0}-day matchup period needs a season start date")]
    MissingSeasonStart(u32),
}

/// League calendar rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueCalendar {
    week_start: Weekday,
    matchup_length_days: u32,
    offset: FixedOffset,
    season_start: Option<NaiveDate>,
}

impl LeagueCalendar {
    pub fn new(
        week_start: Weekday,
        matchup_length_days: u32,
        utc_offset_hours: i32,
        season_start: Option<NaiveDate>,
    ) -> Result<Self, CalendarError> {
        if matchup_length_days == 0 {
            return Err(CalendarError::ZeroLength);
        }
        if matchup_length_days != 7 && season_start.is_none() {
            return Err(CalendarError::MissingSeasonStart(matchup_length_days));
        }
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .ok_or(CalendarError::InvalidOffset(utc_offset_hours))?;
        Ok(Self {
            week_start,
            matchup_length_days,
            offset,
            season_start,
        })
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let week_start = config
            .weekday()
            .ok_or_else(|| CalendarError::InvalidWeekStart(config.week_start.clone()))?;
        Self::new(
            week_start,
            config.matchup_length_days,
            config.utc_offset_hours,
            config.season_start,
        )
    }

    /// First day of the matchup period containing `today`.
    fn period_start(&self, today: NaiveDate) -> NaiveDate {
        let length = i64::from(self.matchup_length_days);
        let anchor = self.season_start.unwrap_or_else(|| {
            let back = (i64::from(today.weekday().num_days_from_monday())
                - i64::from(self.week_start.num_days_from_monday())
                + 7)
                % 7;
            today - Duration::days(back)
        });
        if today < anchor {
            return anchor;
        }
        let periods = (today - anchor).num_days() / length;
        anchor + Duration::days(periods * length)
    }

    fn local_midnight_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

/// Resolve the remaining portion of the active scoring window at `now`.
pub fn resolve_window(
    now: DateTime<Utc>,
    calendar: &LeagueCalendar,
) -> Result<ScoringWindow, WindowError> {
    let today = now.with_timezone(&calendar.offset).date_naive();
    let period_start = calendar.period_start(today);
    let period_end = period_start + Duration::days(i64::from(calendar.matchup_length_days));

    let start_date = period_start.max(today);
    let start = calendar.local_midnight_utc(start_date);
    let end = calendar.local_midnight_utc(period_end) - Duration::seconds(1);

    ScoringWindow::new(start, end)
}
