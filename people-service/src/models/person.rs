use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A stored person document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Person {
    /// New record with a freshly generated identifier.
    pub fn new(fields: PersonFields) -> Self {
        let mut person = Self {
            id: ObjectId::new(),
            name: None,
            image: None,
            title: None,
        };
        person.apply(fields);
        person
    }

    /// Set present values, clear explicit nulls, leave absent fields alone.
    pub fn apply(&mut self, fields: PersonFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(image) = fields.image {
            self.image = image;
        }
        if let Some(title) = fields.title {
            self.title = title;
        }
    }
}

/// Partial field set taken from a request body.
///
/// The outer `Option` records whether the field was present at all; the inner
/// one whether it was `null`. Only a JSON object is accepted; arrays and
/// scalars are a cast failure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct PersonFields {
    pub name: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub title: Option<Option<String>>,
}

#[derive(Deserialize)]
struct RawPersonFields {
    #[serde(default, deserialize_with = "coerce_text")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "coerce_text")]
    image: Option<Option<String>>,
    #[serde(default, deserialize_with = "coerce_text")]
    title: Option<Option<String>>,
}

impl TryFrom<Map<String, Value>> for PersonFields {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let raw: RawPersonFields = serde_json::from_value(Value::Object(object))?;
        Ok(Self {
            name: raw.name,
            image: raw.image,
            title: raw.title,
        })
    }
}

impl PersonFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none() && self.title.is_none()
    }

    /// Build the `$set`/`$unset` modifier for a partial update, or `None` when
    /// there is nothing to change.
    pub fn to_update(&self) -> Option<Document> {
        let mut set = Document::new();
        let mut unset = Document::new();

        for (key, value) in [
            ("name", &self.name),
            ("image", &self.image),
            ("title", &self.title),
        ] {
            match value {
                Some(Some(text)) => {
                    set.insert(key, text.as_str());
                }
                Some(None) => {
                    unset.insert(key, "");
                }
                None => {}
            }
        }

        let mut update = Document::new();
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }

        if update.is_empty() {
            None
        } else {
            Some(update)
        }
    }
}

/// Loose text casting: strings pass through, numbers and booleans become their
/// textual form, `null` clears the field. Objects and arrays are rejected.
fn coerce_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        Value::String(s) => Ok(Some(Some(s))),
        Value::Number(n) => Ok(Some(Some(n.to_string()))),
        Value::Bool(b) => Ok(Some(Some(b.to_string()))),
        other => Err(D::Error::custom(format!(
            "cannot cast {} to a text field",
            other
        ))),
    }
}

/// JSON shape returned by the API: `{ id, name?, image?, title? }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id.to_hex(),
            name: person.name,
            image: person.image,
            title: person.title,
        }
    }
}
