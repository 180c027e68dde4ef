use ahash::{HashMap, HashSet};

use crate::coerce::TypeConverter;

/// Reserved attribute that marks an element as nil.
pub const NIL_ATTRIBUTE: &str = "xsi:nil";
/// Reserved attribute whose value selects a [`TypeConverter`].
pub const TYPE_ATTRIBUTE: &str = "xsi:type";
/// Default key for text content.
pub const DEFAULT_CONTENT_KEY: &str = "content";

/// Options controlling how XML is turned into a value tree.
///
/// A configuration is built once and never changes while a parse runs.
///
/// ```rust
/// use xmlson::ParserConfiguration;
///
/// let config = ParserConfiguration::default()
///     .with_keep_strings(true)
///     .with_force_list(["item"]);
/// assert!(config.is_keep_strings());
/// assert!(config.is_forced_list("item"));
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfiguration {
    cdata_tag_name: String,
    keep_strings: bool,
    convert_nil_attribute_to_null: bool,
    force_list: HashSet<String>,
    type_converters: HashMap<String, TypeConverter>,
}

impl Default for ParserConfiguration {
    fn default() -> Self {
        ParserConfiguration {
            cdata_tag_name: DEFAULT_CONTENT_KEY.to_string(),
            keep_strings: false,
            convert_nil_attribute_to_null: false,
            force_list: HashSet::default(),
            type_converters: HashMap::default(),
        }
    }
}

impl ParserConfiguration {
    /// The default configuration with value coercion switched off.
    pub fn keep_strings() -> Self {
        Self::default().with_keep_strings(true)
    }

    /// Use `name` as the key for text content.
    pub fn with_cdata_tag_name(mut self, name: impl Into<String>) -> Self {
        self.cdata_tag_name = name.into();
        self
    }

    /// Leave all attribute values and text as strings.
    pub fn with_keep_strings(mut self, keep_strings: bool) -> Self {
        self.keep_strings = keep_strings;
        self
    }

    /// Emit `null` for elements carrying `xsi:nil="true"`.
    pub fn with_convert_nil_attribute_to_null(mut self, convert: bool) -> Self {
        self.convert_nil_attribute_to_null = convert;
        self
    }

    /// Tags that are always represented as arrays.
    pub fn with_force_list<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.force_list = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Register a converter selected by `xsi:type="<type_name>"`.
    pub fn with_type_converter(
        mut self,
        type_name: impl Into<String>,
        converter: TypeConverter,
    ) -> Self {
        self.type_converters.insert(type_name.into(), converter);
        self
    }

    pub fn cdata_tag_name(&self) -> &str {
        &self.cdata_tag_name
    }

    pub fn is_keep_strings(&self) -> bool {
        self.keep_strings
    }

    pub fn convert_nil_attribute_to_null(&self) -> bool {
        self.convert_nil_attribute_to_null
    }

    pub fn force_list(&self) -> &HashSet<String> {
        &self.force_list
    }

    pub fn is_forced_list(&self, tag: &str) -> bool {
        self.force_list.contains(tag)
    }

    pub fn has_type_converters(&self) -> bool {
        !self.type_converters.is_empty()
    }

    pub fn type_converter(&self, type_name: &str) -> Option<&TypeConverter> {
        self.type_converters.get(type_name)
    }
}
