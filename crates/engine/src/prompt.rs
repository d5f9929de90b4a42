//! Context injection into the outgoing user turn.

/// Build the user turn sent to the model.
///
/// Without a context the input is sent verbatim.
pub fn augment(input: &str, context: Option<&str>) -> String {
    match context {
        None => input.to_string(),
        Some(documents) => format!(
            "Use the following reference documents to answer the question.\n\n\
             --- DOCUMENTS ---\n{documents}\n--- END DOCUMENTS ---\n\n\
             Question: {input}"
        ),
    }
}
