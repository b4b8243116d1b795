//! Income/expense totals over a period.

use crate::{Movement, Period};

#[derive(Clone, Debug, PartialEq)]
pub struct Balance {
    pub period: Period,
    /// Sum of the positive amounts.
    pub income: f64,
    /// Sum of the negative amounts. Stays negative.
    pub expense: f64,
}

impl Balance {
    /// Sum the movements falling inside `period`.
    ///
    /// Income and expense are accumulated separately and never netted; zero
    /// amounts count for neither.
    pub fn from_movements<'a>(
        period: Period,
        movements: impl IntoIterator<Item = &'a Movement>,
    ) -> Self {
        let (income, expense) = movements
            .into_iter()
            .filter(|m| period.contains(m.date))
            .fold((0.0, 0.0), |(income, expense), m| {
                if m.amount > 0.0 {
                    (income + m.amount, expense)
                } else if m.amount < 0.0 {
                    (income, expense + m.amount)
                } else {
                    (income, expense)
                }
            });

        Self {
            period,
            income,
            expense,
        }
    }
}
