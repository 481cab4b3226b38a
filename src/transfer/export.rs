use thiserror::Error;

use crate::database::models::Whiskey;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Export columns, in file order. Every header is also an import header.
pub const EXPORT_HEADERS: [&str; 50] = [
    "Name",
    "Type",
    "Distillery",
    "Region",
    "Country",
    "Age",
    "ABV",
    "Proof",
    "Size",
    "Quantity",
    "MSRP",
    "Secondary Price",
    "Purchase Date",
    "Purchase Price",
    "Purchase Location",
    "Bottle Code",
    "Rating",
    "Description",
    "Tasting Notes",
    "Status",
    "Is Opened",
    "Date Opened",
    "Remaining Volume",
    "Storage Location",
    "Cask Type",
    "Cask Finish",
    "Barrel Number",
    "Bottle Number",
    "Vintage Year",
    "Bottled Date",
    "Color",
    "Nose Notes",
    "Palate Notes",
    "Finish Notes",
    "Times Tasted",
    "Last Tasted Date",
    "Food Pairings",
    "Current Market Value",
    "Value Gain/Loss",
    "Is Investment Bottle",
    "Mash Bill",
    "Awards",
    "Limited Edition",
    "Chill Filtered",
    "Natural Color",
    "Is For Sale",
    "Asking Price",
    "Is For Trade",
    "Shared With",
    "Private Notes",
];

/// Render records as CSV text: header line plus one line per record,
/// newline-separated with no trailing newline.
pub fn export_csv(records: &[Whiskey]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for whiskey in records {
        writer.write_record(export_row(whiskey))?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn export_row(whiskey: &Whiskey) -> [String; 50] {
    let f = &whiskey.fields;
    [
        f.name.clone(),
        f.whiskey_type.to_string(),
        f.distillery.clone(),
        text(&f.region),
        text(&f.country),
        number(f.age),
        number(f.abv),
        number(f.proof),
        text(&f.size),
        number(f.quantity),
        number(f.msrp),
        number(f.secondary_price),
        text(&f.purchase_date),
        number(f.purchase_price),
        text(&f.purchase_location),
        text(&f.bottle_code),
        number(f.rating),
        text(&f.description),
        text(&f.tasting_notes),
        text(&f.status),
        flag(f.is_opened),
        text(&f.date_opened),
        number(f.remaining_volume),
        text(&f.storage_location),
        text(&f.cask_type),
        text(&f.cask_finish),
        text(&f.barrel_number),
        text(&f.bottle_number),
        text(&f.vintage_year),
        text(&f.bottled_date),
        text(&f.color),
        text(&f.nose_notes),
        text(&f.palate_notes),
        text(&f.finish_notes),
        number(f.times_tasted),
        text(&f.last_tasted_date),
        text(&f.food_pairings),
        number(f.current_market_value),
        number(f.value_gain_loss),
        flag(f.is_investment_bottle),
        text(&f.mash_bill),
        text(&f.awards),
        flag(f.limited_edition),
        flag(f.chill_filtered),
        flag(f.natural_color),
        flag(f.is_for_sale),
        number(f.asking_price),
        flag(f.is_for_trade),
        text(&f.shared_with),
        text(&f.private_notes),
    ]
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// f64 Display is already the shortest form: 50.0 -> "50", 45.5 -> "45.5"
fn number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> String {
    let rendered = if value { "Yes" } else { "No" };
    rendered.to_string()
}
