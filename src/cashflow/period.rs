//! A calendar month selected on the cash flow page.

use std::ops::RangeInclusive;

use time::{Date, Month};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    year: i32,
    month: Month,
}

impl MonthPeriod {
    /// The month `month` (1 to 12) of `year`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPeriod] if `month` is not between 1 and 12 or
    /// `year` is outside the supported range of dates.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod(format!("{year}-{month}"));
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, 1).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// The month number, 1 for January.
    pub fn month_number(self) -> u8 {
        self.month as u8
    }

    pub fn days(self) -> u8 {
        (28..=31)
            .rev()
            .find(|&day| Date::from_calendar_date(self.year, self.month, day).is_ok())
            .unwrap_or(28)
    }

    /// The first to the last day of the month.
    pub fn date_range(self) -> Result<RangeInclusive<Date>, Error> {
        let invalid = |_| Error::InvalidPeriod(format!("{}-{}", self.year, self.month_number()));
        let first = Date::from_calendar_date(self.year, self.month, 1).map_err(invalid)?;
        let last = Date::from_calendar_date(self.year, self.month, self.days()).map_err(invalid)?;

        Ok(first..=last)
    }

    /// The month before this one, which is December of the previous year for January.
    pub fn previous(self) -> Self {
        match self.month {
            Month::January => Self {
                year: self.year - 1,
                month: Month::December,
            },
            month => Self {
                year: self.year,
                month: month.previous(),
            },
        }
    }
}

/// The English name of month `number`, 1 for January.
pub fn month_name(number: u8) -> &'static str {
    match Month::try_from(number) {
        Ok(Month::January) => "January",
        Ok(Month::February) => "February",
        Ok(Month::March) => "March",
        Ok(Month::April) => "April",
        Ok(Month::May) => "May",
        Ok(Month::June) => "June",
        Ok(Month::July) => "July",
        Ok(Month::August) => "August",
        Ok(Month::September) => "September",
        Ok(Month::October) => "October",
        Ok(Month::November) => "November",
        Ok(Month::December) => "December",
        Err(_) => "",
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::MonthPeriod;

    #[test]
    fn rejects_invalid_month() {
        assert_eq!(
            MonthPeriod::new(2024, 13),
            Err(Error::InvalidPeriod("2024-13".to_owned()))
        );
        assert!(MonthPeriod::new(2024, 0).is_err());
    }

    #[test]
    fn date_range_covers_whole_month() {
        let period = MonthPeriod::new(2024, 2).unwrap();

        assert_eq!(
            period.date_range().unwrap(),
            date!(2024 - 02 - 01)..=date!(2024 - 02 - 29)
        );
        assert_eq!(period.days(), 29);
    }

    #[test]
    fn previous_of_january_is_december() {
        let period = MonthPeriod::new(2024, 1).unwrap();

        assert_eq!(period.previous(), MonthPeriod::new(2023, 12).unwrap());
        assert_eq!(
            MonthPeriod::new(2024, 6).unwrap().previous(),
            MonthPeriod::new(2024, 5).unwrap()
        );
    }

    #[test]
    fn containing_uses_date_month() {
        assert_eq!(
            MonthPeriod::containing(date!(2024 - 03 - 15)),
            MonthPeriod::new(2024, 3).unwrap()
        );
    }
}
