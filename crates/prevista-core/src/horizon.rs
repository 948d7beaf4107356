//! Forecast horizon resolution.
//!
//! The user states the horizon either as a day count or as a target end
//! date; both resolve to a whole number of days that is always at least 1.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ValidationError;

pub const MIN_HORIZON_DAYS: u32 = 1;
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// User-facing horizon input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizonChoice {
    Days(u32),
    EndDate(Date),
}

/// Resolved horizon. `clamped` marks an end date in the past or today,
/// which resolves to the minimum instead of failing; callers surface it as
/// a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHorizon {
    pub days: u32,
    pub clamped: bool,
}

/// Resolve a horizon choice against `today`.
///
/// An explicit day count outside `1..=3650` is a validation error. An end
/// date resolves to the whole-day difference from `today`; differences
/// below 1 clamp to 1 with the flag set, so a past date is a degraded
/// request rather than a rejected one.
pub fn resolve(choice: HorizonChoice, today: Date) -> Result<ResolvedHorizon, ValidationError> {
    match choice {
        HorizonChoice::Days(days) => {
            if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&days) {
                return Err(ValidationError::HorizonOutOfRange {
                    days: i64::from(days),
                    min: MIN_HORIZON_DAYS,
                    max: MAX_HORIZON_DAYS,
                });
            }
            Ok(ResolvedHorizon {
                days,
                clamped: false,
            })
        }
        HorizonChoice::EndDate(end) => {
            let days = (end - today).whole_days();
            if days < i64::from(MIN_HORIZON_DAYS) {
                return Ok(ResolvedHorizon {
                    days: MIN_HORIZON_DAYS,
                    clamped: true,
                });
            }
            if days > i64::from(MAX_HORIZON_DAYS) {
                return Err(ValidationError::HorizonOutOfRange {
                    days,
                    min: MIN_HORIZON_DAYS,
                    max: MAX_HORIZON_DAYS,
                });
            }
            Ok(ResolvedHorizon {
                days: days as u32,
                clamped: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn explicit_days_pass_through() {
        let resolved = resolve(HorizonChoice::Days(30), date!(2024 - 06 - 01)).expect("valid");
        assert_eq!(
            resolved,
            ResolvedHorizon {
                days: 30,
                clamped: false
            }
        );
    }

    #[test]
    fn days_out_of_range_are_rejected() {
        let today = date!(2024 - 06 - 01);
        assert!(resolve(HorizonChoice::Days(0), today).is_err());
        assert!(resolve(HorizonChoice::Days(3651), today).is_err());
        assert!(resolve(HorizonChoice::Days(3650), today).is_ok());
    }

    #[test]
    fn future_end_date_resolves_to_whole_days() {
        let today = date!(2024 - 06 - 01);
        let resolved = resolve(HorizonChoice::EndDate(date!(2024 - 07 - 01)), today).expect("valid");
        assert_eq!(
            resolved,
            ResolvedHorizon {
                days: 30,
                clamped: false
            }
        );
    }

    #[test]
    fn past_or_same_day_end_date_clamps_to_minimum() {
        let today = date!(2024 - 06 - 01);

        for end in [date!(2024 - 06 - 01), date!(2024 - 05 - 01)] {
            let resolved = resolve(HorizonChoice::EndDate(end), today).expect("valid");
            assert_eq!(
                resolved,
                ResolvedHorizon {
                    days: 1,
                    clamped: true
                }
            );
        }
    }

    #[test]
    fn far_future_end_date_is_rejected() {
        let today = date!(2024 - 06 - 01);
        let err = resolve(HorizonChoice::EndDate(date!(2040 - 06 - 01)), today)
            .expect_err("must be out of range");
        assert!(matches!(err, ValidationError::HorizonOutOfRange { .. }));
    }
}
