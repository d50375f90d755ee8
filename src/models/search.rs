//! Case-insensitive substring search shared by the admin lists and the wizard model step.

/// True when `term` is blank or is contained in any of `fields`
pub fn matches_search(term: Option<&str>, fields: &[&str]) -> bool {
    match term.map(str::trim) {
        None | Some("") => true,
        Some(term) => {
            let term = term.to_lowercase();
            fields.iter().any(|field| field.to_lowercase().contains(&term))
        }
    }
}
