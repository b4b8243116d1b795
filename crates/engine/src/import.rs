//! Parser for uPlanner spreadsheet exports.
//!
//! The file is `;` separated with a header row and ten fixed columns:
//!
//! | # | column        |
//! |---|---------------|
//! | 0 | date          |
//! | 1 | type          |
//! | 2 | amount        |
//! | 3 | category      |
//! | 4 | sub-category  |
//! | 5 | status        |
//! | 6 | wallet        |
//! | 7 | credit card   |
//! | 8 | invoice       |
//! | 9 | description   |
//!
//! Labels are in Portuguese, as the export produces them.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};

use crate::MovementStatus;

const COLUMNS: usize = 10;

/// One parsed line, names not yet resolved to identifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct UplannerRow {
    /// 1-based line number in the file, header included.
    pub line: usize,
    pub date: NaiveDate,
    /// Signed: expenses are negative.
    pub amount: f64,
    pub category: String,
    pub sub_category: Option<String>,
    pub status: MovementStatus,
    pub wallet: String,
    pub description: String,
}

/// Parse every data line, keeping going after a bad one.
pub fn parse_uplanner(body: &str) -> Vec<Result<UplannerRow, String>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    reader
        .records()
        .enumerate()
        .map(|(idx, record)| {
            // Header is line 1.
            let line = idx + 2;
            record
                .map_err(|err| err.to_string())
                .and_then(|record| parse_record(line, &record))
                .map_err(|err| format!("line {line}: {err}"))
        })
        .collect()
}

fn parse_record(line: usize, record: &StringRecord) -> Result<UplannerRow, String> {
    if record.len() < COLUMNS {
        return Err(format!(
            "expected {COLUMNS} columns, found {}",
            record.len()
        ));
    }
    let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();

    let date = parse_date(field(0))?;
    let magnitude = parse_amount(field(2))?.abs();
    let amount = match field(1) {
        "Receita" => magnitude,
        "Despesa" => -magnitude,
        other => return Err(format!("unknown movement type '{other}'")),
    };
    let status = parse_status(field(5))?;

    let category = field(3);
    if category.is_empty() {
        return Err("missing category".to_string());
    }
    let wallet = field(6);
    if wallet.is_empty() {
        return Err("missing wallet".to_string());
    }
    let sub_category = Some(field(4))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);
    let description = match field(9) {
        "" => category.to_string(),
        text => text.to_string(),
    };

    Ok(UplannerRow {
        line,
        date,
        amount,
        category: category.to_string(),
        sub_category,
        status,
        wallet: wallet.to_string(),
        description,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{value}'"))
}

/// Accepts `1.234,56`, `R$ 10,00`, `-5,5` and plain `12.5`.
pub(crate) fn parse_amount(value: &str) -> Result<f64, String> {
    let cleaned: String = value
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| format!("invalid amount '{value}'"))
}

fn parse_status(value: &str) -> Result<MovementStatus, String> {
    match value {
        "Paga" | "Pago" => Ok(MovementStatus::Paid),
        "Não paga" | "Não pago" => Ok(MovementStatus::Planned),
        other => Err(format!("unknown status '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Data;Tipo;Valor;Categoria;Subcategoria;Status;Conta;Cartão;Fatura;Descrição";

    #[test]
    fn parses_a_full_line() {
        let body = format!(
            "{HEADER}\n05/01/2024;Despesa;1.234,56;Casa;Aluguel;Paga;Nubank;;;Aluguel janeiro\n"
        );
        let rows = parse_uplanner(&body);

        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.line, 2);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(row.amount, -1234.56);
        assert_eq!(row.category, "Casa");
        assert_eq!(row.sub_category.as_deref(), Some("Aluguel"));
        assert_eq!(row.status, MovementStatus::Paid);
        assert_eq!(row.wallet, "Nubank");
        assert_eq!(row.description, "Aluguel janeiro");
    }

    #[test]
    fn income_stays_positive_and_planned_is_mapped() {
        let body = format!("{HEADER}\n2024-02-10;Receita;R$ 3000,00;Salário;;Não paga;Itaú;;;\n");
        let rows = parse_uplanner(&body);
        let row = rows[0].as_ref().unwrap();

        assert_eq!(row.amount, 3000.0);
        assert_eq!(row.status, MovementStatus::Planned);
        assert_eq!(row.sub_category, None);
        assert_eq!(row.description, "Salário");
    }

    #[test]
    fn collects_errors_without_stopping() {
        let body = format!(
            "{HEADER}\n\
             05/01/2024;Despesa;10,00;Casa;;Talvez;Nubank;;;x\n\
             05/01/2024;Transferência;10,00;Casa;;Paga;Nubank;;;x\n\
             05/01/2024;Despesa;10,00;Casa\n\
             06/01/2024;Receita;5,00;Extra;;Paga;Nubank;;;ok\n"
        );
        let rows = parse_uplanner(&body);

        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0].as_ref().unwrap_err(),
            "line 2: unknown status 'Talvez'"
        );
        assert_eq!(
            rows[1].as_ref().unwrap_err(),
            "line 3: unknown movement type 'Transferência'"
        );
        assert_eq!(
            rows[2].as_ref().unwrap_err(),
            "line 4: expected 10 columns, found 4"
        );
        assert!(rows[3].is_ok());
    }

    #[test]
    fn amount_formats() {
        assert_eq!(parse_amount("12.5").unwrap(), 12.5);
        assert_eq!(parse_amount("-5,5").unwrap(), -5.5);
        assert_eq!(parse_amount("R$ 1.000,00").unwrap(), 1000.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn header_only_yields_nothing() {
        assert!(parse_uplanner(HEADER).is_empty());
    }
}
