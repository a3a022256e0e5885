//! Decoded separated-value records.

/// One decoded row: an ordered sequence of field strings.
///
/// A record has no identity beyond its position in the stream. Its width is
/// fixed when it is read; transforms build new records rather than resizing
/// the one they were given, except for the line-number prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `n` fields.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    /// Create a record from anything yielding field values.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at a 0-based index.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        self.fields.get_mut(index)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Append one field.
    pub fn push(&mut self, value: impl Into<String>) {
        self.fields.push(value.into());
    }

    /// Append clones of a run of fields.
    pub fn extend_from_slice(&mut self, values: &[String]) {
        self.fields.extend_from_slice(values);
    }

    /// Insert a field in front of all others (the line-number column).
    pub fn prepend(&mut self, value: impl Into<String>) {
        self.fields.insert(0, value.into());
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    /// True when every field is `""` or the two-character literal `""`.
    ///
    /// With `skip_first` the leading field (a line-number column) is not
    /// considered.
    pub fn is_blank(&self, skip_first: bool) -> bool {
        let skip = usize::from(skip_first);
        self.fields
            .iter()
            .skip(skip)
            .all(|f| f.is_empty() || f == "\"\"")
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl From<&csv::StringRecord> for Record {
    fn from(record: &csv::StringRecord) -> Self {
        Self::from_fields(record.iter())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
