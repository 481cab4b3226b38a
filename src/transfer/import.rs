use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info};

use super::reader::read_rows;
use crate::database::models::{OwnerId, WhiskeyData, WhiskeyId, WhiskeyType};
use crate::database::repository::{StoreError, WhiskeyStore};
use crate::services::QuantityPolicy;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file is empty or invalid")]
    EmptyDocument,
}

/// Who the imported rows belong to
#[derive(Debug, Clone, Copy)]
pub struct Importer<'a> {
    pub owner: OwnerId,
    pub username: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedWhiskey {
    pub name: String,
    #[serde(rename = "type")]
    pub whiskey_type: WhiskeyType,
    pub id: WhiskeyId,
}

/// Outcome of one import, row by row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub imported: Vec<ImportedWhiskey>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn with_total(total: usize) -> Self {
        Self {
            summary: ImportSummary {
                total,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn finish(mut self) -> Self {
        self.summary.imported = self.imported.len();
        self.summary.skipped = self.skipped.len();
        self.summary.errors = self.errors.len();
        self
    }
}

type TextField = fn(&mut WhiskeyData) -> &mut Option<String>;
type IntField = fn(&mut WhiskeyData) -> &mut Option<i32>;
type DecimalField = fn(&mut WhiskeyData) -> &mut Option<f64>;
type FlagField = fn(&mut WhiskeyData) -> &mut Option<bool>;

/// What a recognised header does with its cell
enum Column {
    Text(TextField),
    Int(IntField),
    Decimal(DecimalField),
    Flag(FlagField),
    Type,
    Subcategory,
    Rarity,
    Notes,
    Ignored,
}

/// Native headers plus the aliases used by OnlyDrams exports
static COLUMNS: Lazy<HashMap<&'static str, Column>> = Lazy::new(|| {
    HashMap::from([
        ("Name", Column::Text(|d| &mut d.name)),
        ("Type", Column::Type),
        ("Subcategory", Column::Subcategory),
        ("Category", Column::Ignored),
        ("Distillery", Column::Text(|d| &mut d.distillery)),
        ("Region", Column::Text(|d| &mut d.region)),
        ("Country", Column::Text(|d| &mut d.country)),
        ("Age", Column::Int(|d| &mut d.age)),
        ("ABV", Column::Decimal(|d| &mut d.abv)),
        ("Proof", Column::Decimal(|d| &mut d.proof)),
        ("Size", Column::Text(|d| &mut d.size)),
        ("Quantity", Column::Int(|d| &mut d.quantity)),
        ("MSRP", Column::Decimal(|d| &mut d.msrp)),
        ("Secondary Price", Column::Decimal(|d| &mut d.secondary_price)),
        ("Secondary", Column::Decimal(|d| &mut d.secondary_price)),
        ("Purchase Date", Column::Text(|d| &mut d.purchase_date)),
        ("Purchase Price", Column::Decimal(|d| &mut d.purchase_price)),
        ("Paid", Column::Decimal(|d| &mut d.purchase_price)),
        ("Purchase Location", Column::Text(|d| &mut d.purchase_location)),
        ("Bottle Code", Column::Text(|d| &mut d.bottle_code)),
        ("Rating", Column::Decimal(|d| &mut d.rating)),
        ("Description", Column::Text(|d| &mut d.description)),
        ("Tasting Notes", Column::Text(|d| &mut d.tasting_notes)),
        ("Status", Column::Text(|d| &mut d.status)),
        ("Is Opened", Column::Flag(|d| &mut d.is_opened)),
        ("Date Opened", Column::Text(|d| &mut d.date_opened)),
        ("Remaining Volume", Column::Decimal(|d| &mut d.remaining_volume)),
        ("Storage Location", Column::Text(|d| &mut d.storage_location)),
        ("Cask Type", Column::Text(|d| &mut d.cask_type)),
        ("Cask Finish", Column::Text(|d| &mut d.cask_finish)),
        ("Barrel Number", Column::Text(|d| &mut d.barrel_number)),
        ("Bottle Number", Column::Text(|d| &mut d.bottle_number)),
        ("Vintage Year", Column::Text(|d| &mut d.vintage_year)),
        ("Bottled Date", Column::Text(|d| &mut d.bottled_date)),
        ("Color", Column::Text(|d| &mut d.color)),
        ("Nose Notes", Column::Text(|d| &mut d.nose_notes)),
        ("Palate Notes", Column::Text(|d| &mut d.palate_notes)),
        ("Finish Notes", Column::Text(|d| &mut d.finish_notes)),
        ("Times Tasted", Column::Int(|d| &mut d.times_tasted)),
        ("Last Tasted Date", Column::Text(|d| &mut d.last_tasted_date)),
        ("Food Pairings", Column::Text(|d| &mut d.food_pairings)),
        ("Current Market Value", Column::Decimal(|d| &mut d.current_market_value)),
        ("Value Gain/Loss", Column::Decimal(|d| &mut d.value_gain_loss)),
        ("Is Investment Bottle", Column::Flag(|d| &mut d.is_investment_bottle)),
        ("Mash Bill", Column::Text(|d| &mut d.mash_bill)),
        ("Awards", Column::Text(|d| &mut d.awards)),
        ("Limited Edition", Column::Flag(|d| &mut d.limited_edition)),
        ("Chill Filtered", Column::Flag(|d| &mut d.chill_filtered)),
        ("Natural Color", Column::Flag(|d| &mut d.natural_color)),
        ("Is For Sale", Column::Flag(|d| &mut d.is_for_sale)),
        ("Asking Price", Column::Decimal(|d| &mut d.asking_price)),
        ("Is For Trade", Column::Flag(|d| &mut d.is_for_trade)),
        ("Shared With", Column::Text(|d| &mut d.shared_with)),
        ("Private Notes", Column::Text(|d| &mut d.private_notes)),
        ("Rarity", Column::Rarity),
        ("Notes", Column::Notes),
    ])
});

/// Attributes gathered from one row before derivations run
#[derive(Debug, Default)]
struct RowDraft {
    data: WhiskeyData,
    note_fragments: Vec<String>,
}

impl Column {
    fn apply(&self, draft: &mut RowDraft, value: &str) {
        match self {
            Column::Text(field) => *field(&mut draft.data) = Some(value.to_string()),
            Column::Int(field) => {
                if let Some(n) = parse_int_prefix(value) {
                    *field(&mut draft.data) = Some(n);
                }
            }
            Column::Decimal(field) => {
                if let Some(n) = parse_decimal_prefix(value) {
                    *field(&mut draft.data) = Some(n);
                }
            }
            Column::Flag(field) => *field(&mut draft.data) = Some(parse_flag(value)),
            Column::Type => draft.data.whiskey_type = Some(value.to_lowercase()),
            Column::Subcategory => {
                draft.data.whiskey_type = Some(subcategory_type(value).as_str().to_string())
            }
            Column::Rarity => draft.note_fragments.push(format!("Rarity: {}", value)),
            Column::Notes => draft.note_fragments.push(value.to_string()),
            Column::Ignored => {}
        }
    }
}

impl RowDraft {
    fn from_row(headers: &[String], row: &[String]) -> Self {
        let mut draft = RowDraft::default();
        for (index, header) in headers.iter().enumerate() {
            let Some(column) = COLUMNS.get(header.as_str()) else {
                continue;
            };
            let value = row.get(index).map(String::as_str).unwrap_or("");
            if value.is_empty() {
                continue;
            }
            column.apply(&mut draft, value);
        }
        draft
    }

    /// Run the per-row derivations in order and hand back the final data
    fn finish(self, username: &str, policy: &QuantityPolicy) -> WhiskeyData {
        let RowDraft {
            mut data,
            note_fragments,
        } = self;

        if data.abv.is_none() {
            if let Some(proof) = data.proof {
                data.abv = Some(proof / 2.0);
            }
        }

        if data.is_opened.is_none() {
            data.is_opened = match data.status.as_deref().map(str::to_lowercase).as_deref() {
                Some("unopened") => Some(false),
                Some("opened") => Some(true),
                _ => None,
            };
        }

        if !note_fragments.is_empty() {
            let mut notes: Vec<String> = data.private_notes.take().into_iter().collect();
            notes.extend(note_fragments);
            data.private_notes = Some(notes.join("\n"));
        }

        policy.apply(username, &mut data);
        data
    }
}

/// Import every data row of `text` into the importer's collection.
///
/// Rows are processed in order. A bad row is recorded in the report and
/// never stops the rows after it; rows already stored are kept.
pub async fn import_csv(
    store: &dyn WhiskeyStore,
    importer: Importer<'_>,
    text: &str,
    policy: &QuantityPolicy,
) -> Result<ImportReport, ImportError> {
    let rows = read_rows(text);
    let Some((headers, data_rows)) = rows.split_first() else {
        return Err(ImportError::EmptyDocument);
    };
    if data_rows.is_empty() {
        return Err(ImportError::EmptyDocument);
    }

    let mut report = ImportReport::with_total(data_rows.len());

    for (index, row) in data_rows.iter().enumerate() {
        // header is row 1
        let row_number = index + 2;
        let data = RowDraft::from_row(headers, row).finish(importer.username, policy);

        if data.name.is_none() || data.whiskey_type.is_none() || data.distillery.is_none() {
            report.skipped.push(format!(
                "Row {}: Missing required fields (name, type, or distillery)",
                row_number
            ));
            continue;
        }
        if let Some(raw) = data.whiskey_type.as_deref() {
            if let Err(e) = raw.parse::<WhiskeyType>() {
                report.skipped.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        }

        match store.create(importer.owner, data).await {
            Ok(whiskey) => report.imported.push(ImportedWhiskey {
                id: whiskey.id,
                whiskey_type: whiskey.fields.whiskey_type,
                name: whiskey.fields.name,
            }),
            Err(StoreError::Validation(e)) => {
                report.errors.push(format!("Row {}: {}", row_number, e));
            }
            Err(e) => {
                error!("Failed to save imported row {}: {}", row_number, e);
                report.errors.push(format!("Row {}: Failed to save whiskey", row_number));
            }
        }
    }

    let report = report.finish();
    info!(
        "CSV import for user {}: {} imported, {} skipped, {} errors",
        importer.owner, report.summary.imported, report.summary.skipped, report.summary.errors
    );
    Ok(report)
}

/// OnlyDrams subcategory to whiskey type
pub fn subcategory_type(subcategory: &str) -> WhiskeyType {
    let sub = subcategory.to_lowercase();
    match sub.as_str() {
        "bourbon" => WhiskeyType::Bourbon,
        "rye" => WhiskeyType::Rye,
        s if s.contains("single malt") || s.contains("blended") || s.contains("single grain") => {
            WhiskeyType::Scotch
        }
        s if s.contains("tennessee") => WhiskeyType::Tennessee,
        s if s.contains("canadian") => WhiskeyType::Canadian,
        s if s.contains("irish") => WhiskeyType::Irish,
        s if s.contains("japanese") => WhiskeyType::Japanese,
        _ => WhiskeyType::Other,
    }
}

/// Leading integer of `value`, ignoring any trailing text
pub fn parse_int_prefix(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits = value[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}

/// Leading decimal of `value` (optional sign, digits, fraction), ignoring any trailing text
pub fn parse_decimal_prefix(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let mut end = usize::from(value.starts_with(['+', '-']));

    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    value[..end].parse().ok()
}

/// `yes` in any case, or `1`
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes") || value == "1"
}
