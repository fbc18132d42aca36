//! Turns raw input text into a directory search request

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    PracticeZip,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::PracticeZip => "practice_address.zip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Prefix,
    Fuzzy,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Prefix => "prefix",
            Operator::Fuzzy => "fuzzy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: Field,
    pub op: Operator,
    pub value: String,
}

impl Filter {
    fn new(field: Field, op: Operator, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }
}

/// Immutable search request: ordered filters plus a result limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    filters: Vec<Filter>,
    limit: usize,
}

impl SearchQuery {
    /// Build the request for `text`, or `None` when the text is blank.
    ///
    /// One token searches `first_name` by prefix. Two or more search
    /// `first_name` fuzzily on the first token and `last_name` by prefix on
    /// the last one; anything in between is ignored. A zip filter, when
    /// given, always comes first.
    pub fn build(text: &str, zip: Option<&str>, limit: usize) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (first, rest) = tokens.split_first()?;

        let mut filters = Vec::with_capacity(3);
        if let Some(zip) = zip {
            filters.push(Filter::new(Field::PracticeZip, Operator::Prefix, zip));
        }

        match rest.last() {
            None => filters.push(Filter::new(
                Field::FirstName,
                Operator::Prefix,
                first.to_lowercase(),
            )),
            Some(last) => {
                filters.push(Filter::new(
                    Field::FirstName,
                    Operator::Fuzzy,
                    first.to_lowercase(),
                ));
                filters.push(Filter::new(
                    Field::LastName,
                    Operator::Prefix,
                    last.to_lowercase(),
                ));
            }
        }

        Some(Self { filters, limit })
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Query parameters in wire order: `limit`, then `key{n}`/`op{n}`/`value{n}` from 1
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(1 + self.filters.len() * 3);
        params.push(("limit".to_string(), self.limit.to_string()));
        for (i, filter) in self.filters.iter().enumerate() {
            let n = i + 1;
            params.push((format!("key{n}"), filter.field.as_str().to_string()));
            params.push((format!("op{n}"), filter.op.as_str().to_string()));
            params.push((format!("value{n}"), filter.value.clone()));
        }
        params
    }
}

impl fmt::Display for SearchQuery {
    /// URL-encoded query string, without the leading `?`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded: Vec<String> = self
            .params()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        f.write_str(&encoded.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(q: &SearchQuery) -> Vec<(Field, Operator, &str)> {
        q.filters()
            .iter()
            .map(|f| (f.field, f.op, f.value.as_str()))
            .collect()
    }

    #[test]
    fn test_blank_input_builds_nothing() {
        assert_eq!(SearchQuery::build("", None, 5), None);
        assert_eq!(SearchQuery::build("   \t ", Some("021"), 5), None);
    }

    #[test]
    fn test_single_token_is_first_name_prefix() {
        let q = SearchQuery::build("  John ", None, 5).unwrap();
        assert_eq!(fields(&q), vec![(Field::FirstName, Operator::Prefix, "john")]);
        assert_eq!(q.limit(), 5);
    }

    #[test]
    fn test_two_tokens_fuzzy_first_prefix_last() {
        let q = SearchQuery::build("John Sm", None, 5).unwrap();
        assert_eq!(
            fields(&q),
            vec![
                (Field::FirstName, Operator::Fuzzy, "john"),
                (Field::LastName, Operator::Prefix, "sm"),
            ]
        );
    }

    #[test]
    fn test_middle_tokens_are_dropped() {
        let q = SearchQuery::build("Mary  Ann\tLee", None, 5).unwrap();
        assert_eq!(
            fields(&q),
            vec![
                (Field::FirstName, Operator::Fuzzy, "mary"),
                (Field::LastName, Operator::Prefix, "lee"),
            ]
        );
    }

    #[test]
    fn test_zip_filter_comes_first() {
        let q = SearchQuery::build("john", Some("94110"), 5).unwrap();
        assert_eq!(
            fields(&q),
            vec![
                (Field::PracticeZip, Operator::Prefix, "94110"),
                (Field::FirstName, Operator::Prefix, "john"),
            ]
        );

        let q = SearchQuery::build("john smith", Some("94110"), 5).unwrap();
        assert_eq!(q.filters().len(), 3);
        assert_eq!(q.filters()[0].field, Field::PracticeZip);
    }

    #[test]
    fn test_filter_count_by_token_count() {
        for (text, expected) in [("a", 1), ("a b", 2), ("a b c", 2), ("a b c d e", 2)] {
            let plain = SearchQuery::build(text, None, 5).unwrap();
            assert_eq!(plain.filters().len(), expected, "{text}");
            let zipped = SearchQuery::build(text, Some("1"), 5).unwrap();
            assert_eq!(zipped.filters().len(), expected + 1, "{text}");
        }
    }

    #[test]
    fn test_query_string() {
        let q = SearchQuery::build("John Sm", Some("94110"), 5).unwrap();
        insta::assert_snapshot!(q.to_string(), @"limit=5&key1=practice_address.zip&op1=prefix&value1=94110&key2=first_name&op2=fuzzy&value2=john&key3=last_name&op3=prefix&value3=sm");
    }

    #[test]
    fn test_query_string_encodes_values() {
        let q = SearchQuery::build("o'brien", None, 5).unwrap();
        assert_eq!(
            q.to_string(),
            "limit=5&key1=first_name&op1=prefix&value1=o%27brien"
        );
    }
}
