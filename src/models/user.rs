use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::database::StoreError;

/// Collection holding user records.
pub const USERS_COLLECTION: &str = "users";

/// User record as stored in MongoDB.
///
/// Field names follow the documents the service has always written
/// (`_id`, `createdAt`, `updatedAt`), so existing collections stay readable.
/// Unknown keys such as a version counter are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,

    pub surname: String,

    /// Only unique by convention: see `middleware::check_email`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,

    #[serde(rename = "updatedAt")]
    pub updated_at: BsonDateTime,
}

impl User {
    /// Applies the record schema to `new_user` and stamps a fresh id and
    /// both timestamps. Every store calls this on insert.
    pub fn create(new_user: NewUser) -> Result<Self, StoreError> {
        let fields = new_user.validate()?;

        let now = BsonDateTime::now();
        Ok(Self {
            id: ObjectId::new(),
            name: fields.name,
            surname: fields.surname,
            email: fields.email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the fields present in `changes` and refreshes `updatedAt`.
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(surname) = &changes.surname {
            self.surname = surname.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        self.updated_at = BsonDateTime::now();
    }
}

/// Casts a JSON value to a string field.
///
/// Strings pass through, numbers and booleans take their textual form and
/// `null` means no value. Arrays and objects have no string form.
fn cast_string(path: &str, value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => {
            let kind = if value.is_array() { "Array" } else { "Object" };
            Err(format!(
                "Cast to string failed for value \"{}\" (type {}) at path \"{}\"",
                value, kind, path
            ))
        }
    }
}

/// Keeps an explicit `null` distinguishable from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Request body for `POST /user`.
///
/// Fields are taken as raw JSON: type mismatches and missing required
/// fields are schema failures on insert, not extractor errors.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({"name": "John", "surname": "Doe", "email": "john@example.com"}))]
pub struct NewUser {
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub surname: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
}

/// Fields of a [`NewUser`] that passed the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
}

impl NewUser {
    /// Email as the duplicate check sees it. A value with no string form
    /// yields `None` and is left to the schema.
    pub fn email_key(&self) -> Option<String> {
        self.email
            .as_ref()
            .and_then(|value| cast_string("email", value).ok().flatten())
    }

    /// Record schema: `name` and `surname` are required and non-empty,
    /// every field must have a string form.
    pub fn validate(&self) -> Result<UserFields, StoreError> {
        let mut failures = Vec::new();

        let mut required = |path: &str, value: &Option<Value>| {
            match value.as_ref().map(|v| cast_string(path, v)) {
                Some(Ok(Some(s))) if !s.is_empty() => Some(s),
                Some(Err(msg)) => {
                    failures.push(format!("{}: {}", path, msg));
                    None
                }
                _ => {
                    failures.push(format!("{path}: Path `{path}` is required."));
                    None
                }
            }
        };

        let name = required("name", &self.name);
        let surname = required("surname", &self.surname);

        let email = match self.email.as_ref().map(|v| cast_string("email", v)) {
            Some(Ok(email)) => email,
            Some(Err(msg)) => {
                failures.push(format!("email: {}", msg));
                None
            }
            None => None,
        };

        match (name, surname) {
            (Some(name), Some(surname)) if failures.is_empty() => Ok(UserFields {
                name,
                surname,
                email,
            }),
            _ => Err(StoreError::Validation(format!(
                "User validation failed: {}",
                failures.join(", ")
            ))),
        }
    }
}

/// Request body for `PATCH /user`. The record is addressed by `_id` in the body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub surname: Option<Value>,
    /// `null` clears the stored email.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
}

impl UpdateUserRequest {
    /// Casts the body fields into store changes.
    ///
    /// `null` clears `email`. `name` and `surname` are required on every
    /// record, so a `null` there leaves the stored value as is.
    pub fn changes(&self) -> Result<UserChanges, StoreError> {
        let cast = |path: &str, value: &Option<Value>| match value {
            Some(v) => cast_string(path, v).map(Some).map_err(StoreError::Cast),
            None => Ok(None),
        };

        Ok(UserChanges {
            name: cast("name", &self.name)?.flatten(),
            surname: cast("surname", &self.surname)?.flatten(),
            email: cast("email", &self.email)?,
        })
    }
}

/// Field overwrites for an update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    /// `Some(None)` removes the email.
    pub email: Option<Option<String>>,
}

impl UserChanges {
    /// Update document: `$set` for the changed fields and the `updatedAt`
    /// stamp, `$unset` for a cleared email.
    pub fn to_update_document(&self) -> Document {
        let mut set = doc! { "updatedAt": BsonDateTime::now() };

        if let Some(name) = &self.name {
            set.insert("name", name);
        }
        if let Some(surname) = &self.surname {
            set.insert("surname", surname);
        }

        let mut update = Document::new();
        match &self.email {
            Some(Some(email)) => {
                set.insert("email", email);
            }
            Some(None) => {
                update.insert("$unset", doc! { "email": "" });
            }
            None => {}
        }
        update.insert("$set", set);

        update
    }
}

/// User record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "_id": "64b7f0c2e1a4f2a1b3c4d5e6",
    "id": "64b7f0c2e1a4f2a1b3c4d5e6",
    "name": "John",
    "surname": "Doe",
    "email": "john@example.com",
    "createdAt": "2024-01-01T00:00:00Z",
    "updatedAt": "2024-01-01T00:00:00Z"
}))]
pub struct UserResponse {
    /// The auto-generated id of the user
    #[serde(rename = "_id")]
    pub object_id: String,

    /// Same value as `_id`
    pub id: String,

    pub name: String,

    pub surname: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "createdAt")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let id = u.id.to_hex();
        UserResponse {
            object_id: id.clone(),
            id,
            name: u.name,
            surname: u.surname,
            email: u.email,
            created_at: to_utc(u.created_at),
            updated_at: to_utc(u.updated_at),
        }
    }
}

fn to_utc(dt: BsonDateTime) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(dt.timestamp_millis())
        .single()
        .unwrap_or_default()
}

/// Parses a client-supplied identifier into an ObjectId.
pub fn parse_user_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(raw).map_err(|_| {
        StoreError::Cast(format!(
            "Cast to ObjectId failed for value \"{}\" (type string) at path \"_id\" for model \"User\"",
            raw
        ))
    })
}
