use std::collections::HashMap;

/// Request parameters merged from the query string and an urlencoded body.
///
/// The first value for a key wins; body fields come before query fields.
#[derive(Debug, Default, Clone)]
pub struct DohParams {
    values: HashMap<String, String>,
}

impl DohParams {
    pub fn parse(query: Option<&str>, form_body: Option<&[u8]>) -> Self {
        let mut values = HashMap::new();

        let body_pairs = form_body.into_iter().flat_map(url::form_urlencoded::parse);
        let query_pairs = query
            .into_iter()
            .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()));

        for (key, value) in body_pairs.chain(query_pairs) {
            values
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Present with a non-empty value.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}
