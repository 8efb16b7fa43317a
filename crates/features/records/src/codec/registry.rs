use crate::codec::{CLASS_KEY, Decoded, Record, RecordRef, Tag, wire};
use crate::error::RecordsError;
use fxhash::FxHashMap;
use serde_json::{Map, Value};

pub type EncodeFn = fn(RecordRef<'_>) -> Result<Map<String, Value>, RecordsError>;
pub type DecodeFn = fn(Map<String, Value>) -> Result<Record, RecordsError>;

/// How one tag is written and read back. `encode` returns the fields without the
/// discriminator; `decode` receives them with the discriminator already removed.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

impl Rule {
    /// The built-in rule for `tag`.
    #[must_use]
    pub fn standard(tag: Tag) -> Self {
        match tag {
            Tag::User => Self { encode: wire::encode_identity, decode: wire::decode_identity },
            Tag::Teacher => Self { encode: wire::encode_teacher, decode: wire::decode_teacher },
            Tag::Student => Self { encode: wire::encode_student, decode: wire::decode_student },
            Tag::Course => Self { encode: wire::encode_course, decode: wire::decode_course },
        }
    }
}

/// Explicit tag to rule table driving [`encode`](Self::encode) and [`decode`](Self::decode).
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    rules: FxHashMap<Tag, Rule>,
}

impl CodecRegistry {
    /// A registry with no rules: every encode fails and every decode passes through.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All four built-in rules.
    #[must_use]
    pub fn standard() -> Self {
        Tag::ALL.into_iter().fold(Self::empty(), |registry, tag| registry.with(tag, Rule::standard(tag)))
    }

    #[must_use]
    pub fn with(mut self, tag: Tag, rule: Rule) -> Self {
        self.register(tag, rule);
        self
    }

    /// Installs `rule` for `tag`, returning the rule it replaced.
    pub fn register(&mut self, tag: Tag, rule: Rule) -> Option<Rule> {
        self.rules.insert(tag, rule)
    }

    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.rules.contains_key(&tag)
    }

    /// Writes `record` as a JSON object carrying the `__class__` discriminator.
    ///
    /// # Errors
    /// [`RecordsError::Serialization`] when no rule is registered for the record's tag.
    pub fn encode<'a>(&self, record: impl Into<RecordRef<'a>>) -> Result<Value, RecordsError> {
        let record = record.into();
        let tag = record.tag();
        let rule = self.rules.get(&tag).ok_or_else(|| RecordsError::Serialization {
            message: format!("No codec rule registered for '{tag}'").into(),
            context: None,
        })?;

        let mut fields = (rule.encode)(record)?;
        fields.insert(CLASS_KEY.to_owned(), Value::String(tag.as_str().to_owned()));
        Ok(Value::Object(fields))
    }

    /// Rebuilds an entity from its tagged form. Values without a known, registered tag come
    /// back unchanged as [`Decoded::Raw`].
    ///
    /// # Errors
    /// [`RecordsError::Decode`] when a recognised entity has missing or mistyped fields.
    pub fn decode(&self, value: Value) -> Result<Decoded, RecordsError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Ok(Decoded::Raw(other)),
        };

        let rule = fields
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .and_then(Tag::from_wire)
            .and_then(|tag| self.rules.get(&tag).copied());

        let Some(rule) = rule else {
            return Ok(Decoded::Raw(Value::Object(fields)));
        };

        fields.remove(CLASS_KEY);
        (rule.decode)(fields).map(Decoded::Record)
    }
}
