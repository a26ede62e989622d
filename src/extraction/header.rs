/// Strips the issuing-body label from the front of a record's text.
pub struct HeaderStripper<'a> {
    labels: &'a [String],
}

impl<'a> HeaderStripper<'a> {
    pub fn new(labels: &'a [String]) -> Self {
        Self { labels }
    }

    /// Splits `text` into the matched label and the remaining body.
    ///
    /// Matching is case-sensitive after trimming leading whitespace. When no
    /// label matches, the label is `None` and the text is returned unchanged.
    pub fn strip<'t>(&self, text: &'t str) -> (Option<&'a str>, &'t str) {
        let trimmed = text.trim_start();
        for label in self.labels {
            if let Some(rest) = trimmed.strip_prefix(label.as_str()) {
                let body = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
                return (Some(label.as_str()), body);
            }
        }
        (None, text)
    }
}
