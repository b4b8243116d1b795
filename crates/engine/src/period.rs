//! Date ranges used to scope aggregate queries.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

/// A closed date range `[from, to]`.
///
/// An unset `from` is the zero date. An unset `to` leaves the range open on
/// the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl Period {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<Self> {
        let from = from.unwrap_or(NaiveDate::MIN);
        if let Some(to) = to
            && to < from
        {
            return Err(EngineError::Validation(format!(
                "invalid period: to ({to}) is before from ({from})"
            )));
        }

        Ok(Self { from, to })
    }

    /// Parse `YYYY-MM-DD` bounds. Empty strings count as unset.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> ResultEngine<Self> {
        Self::new(parse_date(from, "from")?, parse_date(to, "to")?)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.is_none_or(|to| date <= to)
    }
}

fn parse_date(value: Option<&str>, label: &str) -> ResultEngine<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| EngineError::Validation(format!("invalid {label} date: {value}")))
}
