use crate::countries::validator::RowRejection;

/// Number of rejection reasons quoted in a failure message.
pub const MAX_LISTED_REJECTIONS: usize = 5;

pub fn no_valid_rows_message(rejections: &[RowRejection]) -> String {
    let mut msg = String::from("No valid country data found in Excel file.");
    if rejections.is_empty() {
        return msg;
    }

    let listed: Vec<String> = rejections
        .iter()
        .take(MAX_LISTED_REJECTIONS)
        .map(|r| r.to_string())
        .collect();
    msg.push_str(" Invalid rows: ");
    msg.push_str(&listed.join(", "));

    if rejections.len() > MAX_LISTED_REJECTIONS {
        msg.push_str(&format!(
            " and {} more...",
            rejections.len() - MAX_LISTED_REJECTIONS
        ));
    }
    msg
}

pub fn uploaded_message(uploaded: usize, skipped: usize) -> String {
    let mut msg = format!("Successfully uploaded {} countries", uploaded);
    if skipped > 0 {
        msg.push_str(&format!(
            ". {} rows skipped (invalid or no country name)",
            skipped
        ));
    }
    msg
}
