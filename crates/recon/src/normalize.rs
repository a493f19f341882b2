//! Record normalization.
//!
//! Turns raw SMS and Tally tables into [`Record`]s with comparable fields.
//! Both normalizers tolerate missing columns (absent cells read as empty,
//! which parses to None) and never reject a row: a record with a null date
//! or amount simply cannot match and surfaces as unmatched.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use milap_core::{Direction, Money, Record, Side};

use crate::schema;
use crate::table::{cell, RawTable};

/// Normalizes a bank SMS export. The category comes from `PaymentMode`
/// when that column exists, else from `Transaction Type`, else the literal
/// fallback; all text fields are uppercased for comparison.
pub fn normalize_sms(table: &RawTable) -> Vec<Record> {
    let date_col = table.column("TransactionDate");
    let mode_col = table.column("TransactionMode");
    let desc_col = table.column("Description");
    let remarks_col = table.column("Remarks");
    let debit_col = table.column("Debit");
    let credit_col = table.column("Credit");
    let payment_mode_col = table.column("PaymentMode");
    let txn_type_col = table.column("Transaction Type");

    table
        .rows
        .iter()
        .map(|row| {
            let mut record = Record::new(Side::Sms);

            let category = if payment_mode_col.is_some() {
                cell(row, payment_mode_col)
            } else if txn_type_col.is_some() {
                cell(row, txn_type_col)
            } else {
                "Others"
            };
            record.category = category.to_uppercase();

            let description = cell(row, desc_col);
            record.identifier = normalize_identifier(description);
            record.description = description.trim().to_uppercase();
            record.mode = cell(row, mode_col).trim().to_uppercase();
            record.remarks = cell(row, remarks_col).to_uppercase();
            record.date = parse_date_lenient(cell(row, date_col), false);

            let debit = parse_number(cell(row, debit_col));
            let credit = parse_number(cell(row, credit_col));
            record.amount = signed_amount(debit, credit);
            record.direction = direction_of(debit, credit);

            record
        })
        .collect()
}

/// Normalizes a Tally ledger export. Report-title rows above the real
/// header are discarded, historic column names are rewritten, and the
/// category is the voucher type. Particulars keep their original casing;
/// they are display text, not a match key.
pub fn normalize_ledger(table: &RawTable) -> Vec<Record> {
    let (mut columns, rows): (Vec<String>, &[Vec<String>]) =
        match schema::find_header_row(&table.rows) {
            Some(idx) => (
                table.rows[idx].iter().map(|c| c.trim().to_string()).collect(),
                &table.rows[idx + 1..],
            ),
            None => (
                table.columns.iter().map(|c| c.trim().to_string()).collect(),
                &table.rows[..],
            ),
        };
    schema::resolve_ledger_aliases(&mut columns);

    let col = |name: &str| columns.iter().position(|c| c == name);
    let date_col = col("Date");
    let particulars_col = col("Particulars");
    let vch_type_col = col("Vch Type");
    let vch_no_col = col("Vch No.");
    let notes_col = col("Notes");
    let debit_col = col("Debit");
    let credit_col = col("Credit");

    rows.iter()
        .map(|row| {
            let mut record = Record::new(Side::Tally);

            let voucher = cell(row, vch_no_col);
            record.voucher_no = voucher.to_uppercase();
            record.identifier = normalize_identifier(voucher);
            record.category = cell(row, vch_type_col).to_uppercase();
            record.description = cell(row, particulars_col).to_string();
            record.remarks = cell(row, notes_col).to_string();
            record.date = parse_date_lenient(cell(row, date_col), false);

            let debit = parse_number(cell(row, debit_col));
            let credit = parse_number(cell(row, credit_col));
            record.amount = signed_amount(debit, credit);
            record.direction = direction_of(debit, credit);

            record
        })
        .collect()
}

/// Signed amount from the debit/credit pair: debit minus credit, with an
/// absent side read as zero. Null only when both sides fail to parse.
pub(crate) fn signed_amount(debit: Option<Decimal>, credit: Option<Decimal>) -> Option<Money> {
    if debit.is_none() && credit.is_none() {
        return None;
    }
    let debit = debit.unwrap_or(Decimal::ZERO);
    let credit = credit.unwrap_or(Decimal::ZERO);
    Some(Money::from_decimal(debit - credit))
}

/// Credit wins when both sides carry a nonzero value; all-zero rows have
/// no usable direction.
pub(crate) fn direction_of(debit: Option<Decimal>, credit: Option<Decimal>) -> Direction {
    match (debit, credit) {
        (_, Some(credit)) if !credit.is_zero() => Direction::Credit,
        (Some(debit), _) if !debit.is_zero() => Direction::Debit,
        _ => Direction::Unknown,
    }
}

/// Uppercases and strips everything but ASCII alphanumerics. This is the
/// weak join key shared by SMS descriptions and voucher numbers.
pub(crate) fn normalize_identifier(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Lenient numeric parse: grouping commas, currency symbols and
/// accounting-style parentheses are tolerated. None when nothing numeric
/// remains.
pub(crate) fn parse_number(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (negative, text) = if text.starts_with('(') && text.ends_with(')') {
        (true, &text[1..text.len() - 1])
    } else {
        (false, text)
    };
    let cleaned = text.replace([',', '$', '₹', ' '], "");
    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -value } else { value })
}

/// Permissive date parse over the formats the exports actually use.
/// `day_first` flips which side of an ambiguous all-numeric date wins; GST
/// registers prefer day-first, everything else month-first.
pub(crate) fn parse_date_lenient(text: &str, day_first: bool) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    const NAMED_MONTH: &[&str] = &["%d-%b-%y", "%d-%b-%Y", "%d %b %Y", "%d %B %Y"];
    const MONTH_FIRST: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%m/%d/%Y", "%m-%d-%Y"];
    const DAY_FIRST: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
    // Two-digit-year formats must run first: %Y greedily accepts short
    // years, so "01-04-23" would otherwise parse as year 1.
    const ISO: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    const STAMPS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let (first, second) = if day_first {
        (DAY_FIRST, MONTH_FIRST)
    } else {
        (MONTH_FIRST, DAY_FIRST)
    };

    for fmt in NAMED_MONTH.iter().chain(first).chain(second).chain(ISO) {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    // Excel exports often carry a midnight timestamp.
    for fmt in STAMPS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(stamp.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn money(text: &str) -> Money {
        Money::from_decimal(Decimal::from_str(text).expect("valid decimal"))
    }

    // ── parse_number ──────────────────────────────────────────────────

    #[test]
    fn parses_plain_and_grouped_numbers() {
        assert_eq!(parse_number("100"), Some(Decimal::from_str("100").unwrap()));
        assert_eq!(
            parse_number("1,234.56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
    }

    #[test]
    fn parses_currency_symbols() {
        assert_eq!(
            parse_number("₹2,500.00"),
            Some(Decimal::from_str("2500.00").unwrap())
        );
    }

    #[test]
    fn parses_parenthesised_negatives() {
        assert_eq!(
            parse_number("(350.25)"),
            Some(Decimal::from_str("-350.25").unwrap())
        );
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
    }

    // ── parse_date_lenient ────────────────────────────────────────────

    #[test]
    fn parses_common_formats() {
        assert_eq!(parse_date_lenient("2024-01-15", false), Some(date(2024, 1, 15)));
        assert_eq!(parse_date_lenient("15-Apr-24", false), Some(date(2024, 4, 15)));
        assert_eq!(parse_date_lenient("14 April 2023", false), Some(date(2023, 4, 14)));
        assert_eq!(
            parse_date_lenient("2024-01-15 00:00:00", false),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn ambiguous_dates_follow_the_day_first_flag() {
        assert_eq!(parse_date_lenient("01/02/2024", false), Some(date(2024, 1, 2)));
        assert_eq!(parse_date_lenient("01/02/2024", true), Some(date(2024, 2, 1)));
    }

    #[test]
    fn unambiguous_numeric_dates_parse_either_way() {
        assert_eq!(parse_date_lenient("31/01/2024", false), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_lenient("01/31/2024", true), Some(date(2024, 1, 31)));
    }

    #[test]
    fn garbage_dates_are_none() {
        assert_eq!(parse_date_lenient("yesterday", false), None);
        assert_eq!(parse_date_lenient("", false), None);
    }

    // ── identifiers, amounts, directions ──────────────────────────────

    #[test]
    fn identifier_keeps_only_alphanumerics() {
        assert_eq!(normalize_identifier("Rent-Payment #42"), "RENTPAYMENT42");
        assert_eq!(normalize_identifier("upi/1234/ok"), "UPI1234OK");
        assert_eq!(normalize_identifier("---"), "");
    }

    #[test]
    fn amount_is_debit_minus_credit() {
        assert_eq!(
            signed_amount(Some(Decimal::from_str("100").unwrap()), None),
            Some(money("100"))
        );
        assert_eq!(
            signed_amount(None, Some(Decimal::from_str("250.50").unwrap())),
            Some(money("-250.50"))
        );
        assert_eq!(
            signed_amount(
                Some(Decimal::from_str("100").unwrap()),
                Some(Decimal::from_str("30").unwrap())
            ),
            Some(money("70"))
        );
        assert_eq!(signed_amount(None, None), None);
    }

    #[test]
    fn credit_wins_the_direction_tie() {
        let hundred = Some(Decimal::from_str("100").unwrap());
        let zero = Some(Decimal::ZERO);
        assert_eq!(direction_of(hundred, hundred), Direction::Credit);
        assert_eq!(direction_of(hundred, zero), Direction::Debit);
        assert_eq!(direction_of(hundred, None), Direction::Debit);
        assert_eq!(direction_of(zero, zero), Direction::Unknown);
        assert_eq!(direction_of(None, None), Direction::Unknown);
    }

    // ── SMS normalization ─────────────────────────────────────────────

    #[test]
    fn normalizes_a_full_sms_row() {
        let table = RawTable::from_csv_str(
            "TransactionDate,TransactionMode,Description,Remarks,Debit,Credit,PaymentMode\n\
             2024-01-05, upi , Rent INV42 , flat 4b ,1200.00,,NEFT\n",
        )
        .expect("should parse");
        let records = normalize_sms(&table);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.side, Side::Sms);
        assert_eq!(record.date, Some(date(2024, 1, 5)));
        assert_eq!(record.amount, Some(money("1200.00")));
        assert_eq!(record.direction, Direction::Debit);
        assert_eq!(record.description, "RENT INV42");
        assert_eq!(record.remarks, " FLAT 4B ");
        assert_eq!(record.mode, "UPI");
        assert_eq!(record.category, "NEFT");
        assert_eq!(record.identifier, "RENTINV42");
        assert!(!record.is_tallied());
    }

    #[test]
    fn sms_category_falls_back_to_transaction_type() {
        let table = RawTable::from_csv_str("Description,Transaction Type\nx,card\n")
            .expect("should parse");
        assert_eq!(normalize_sms(&table)[0].category, "CARD");
    }

    #[test]
    fn sms_category_defaults_when_no_source_column() {
        let table = RawTable::from_csv_str("Description\nx\n").expect("should parse");
        assert_eq!(normalize_sms(&table)[0].category, "OTHERS");
    }

    #[test]
    fn sms_with_unparseable_amounts_has_null_amount() {
        let table = RawTable::from_csv_str("Description,Debit,Credit\nx,abc,xyz\n")
            .expect("should parse");
        let record = &normalize_sms(&table)[0];
        assert_eq!(record.amount, None);
        assert_eq!(record.direction, Direction::Unknown);
    }

    #[test]
    fn sms_missing_columns_synthesize_empty() {
        let table = RawTable::from_csv_str("Description\nsomething\n").expect("should parse");
        let record = &normalize_sms(&table)[0];
        assert_eq!(record.date, None);
        assert_eq!(record.amount, None);
        assert_eq!(record.remarks, "");
        assert_eq!(record.mode, "");
    }

    // ── ledger normalization ──────────────────────────────────────────

    #[test]
    fn normalizes_a_full_ledger_row() {
        let table = RawTable::from_csv_str(
            "Date,Particulars,Vch Type,Vch No.,Notes,Debit,Credit\n\
             2024-01-05,Rent for January,Payment,inv42,paid late,,1200.00\n",
        )
        .expect("should parse");
        let records = normalize_ledger(&table);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.side, Side::Tally);
        assert_eq!(record.date, Some(date(2024, 1, 5)));
        assert_eq!(record.amount, Some(money("-1200.00")));
        assert_eq!(record.direction, Direction::Credit);
        assert_eq!(record.voucher_no, "INV42");
        assert_eq!(record.identifier, "INV42");
        assert_eq!(record.category, "PAYMENT");
        // Particulars and notes keep their casing.
        assert_eq!(record.description, "Rent for January");
        assert_eq!(record.remarks, "paid late");
    }

    #[test]
    fn ledger_header_is_relocated_below_title_rows() {
        let table = RawTable::from_csv_str(
            "Saral Books Pvt Ltd,,,\n\
             Ledger: HDFC Bank,,,\n\
             Date,Particulars,Vch Type,Vch No.\n\
             2024-02-01,Office chairs,Purchase,PO-7\n",
        )
        .expect("should parse");
        let records = normalize_ledger(&table);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, Some(date(2024, 2, 1)));
        assert_eq!(records[0].voucher_no, "PO-7");
        assert_eq!(records[0].category, "PURCHASE");
    }

    #[test]
    fn ledger_aliases_are_resolved() {
        let table = RawTable::from_csv_str(
            "Date,Particulars,Voucher Type,Voucher No,Debit,Credit\n\
             2024-02-01,Chairs,Purchase,PO-7,500,\n",
        )
        .expect("should parse");
        let record = &normalize_ledger(&table)[0];
        assert_eq!(record.category, "PURCHASE");
        assert_eq!(record.voucher_no, "PO-7");
    }

    #[test]
    fn ledger_without_header_token_keeps_first_row_as_header() {
        let table = RawTable::from_csv_str(
            "Date,Particulars,Vch Type,Vch No.\n2024-03-09,Stationery,Payment,V-1\n",
        )
        .expect("should parse");
        let records = normalize_ledger(&table);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, Some(date(2024, 3, 9)));
    }
}
