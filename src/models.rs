use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// A persisted entity with an assigned integer identifier.
pub trait Record {
    fn id(&self) -> u64;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Registration input. Unrecognized fields in the request body are dropped.
#[derive(Deserialize, Debug)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub address: Option<Address>,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn from_input(input: Value) -> Result<Self, AppError> {
        let new_user: NewUser =
            serde_json::from_value(input).map_err(|e| AppError::Validation(e.to_string()))?;

        if new_user.username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if new_user.password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }

        Ok(new_user)
    }

    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            password: self.password,
            email: self.email,
            address: self.address,
            avatar: self.avatar,
            cv: None,
        }
    }
}

/// User as exposed by the API. Never carries the password.
#[derive(Serialize, Debug)]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            address: user.address.clone(),
            avatar: user.avatar.clone(),
            cv: user.cv.clone(),
        }
    }
}

/// Partial profile update. Provided fields overwrite, absent fields are kept.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub avatar: Option<String>,
    pub cv: Option<String>,
}

impl UserUpdate {
    pub fn from_input(input: Value) -> Result<Self, AppError> {
        serde_json::from_value(input).map_err(|e| AppError::Validation(e.to_string()))
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(cv) = self.cv {
            user.cv = Some(cv);
        }
    }
}

/// A blog post: assigned id plus whatever fields the request carried.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Blog {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Blog {
    pub fn from_input(input: Value, id: u64) -> Result<Self, AppError> {
        let mut fields = as_object(input)?;
        // a client-supplied id never wins over the assigned one
        fields.remove("id");

        Ok(Self { id, fields })
    }
}

impl Record for Blog {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Comment {
    pub id: u64,
    #[serde(rename = "blogId")]
    pub blog_id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Comment {
    pub fn from_input(input: Value, id: u64) -> Result<Self, AppError> {
        let mut fields = as_object(input)?;
        fields.remove("id");

        let blog_id = fields
            .remove("blogId")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AppError::Validation("blogId must be an integer".into()))?;

        Ok(Self {
            id,
            blog_id,
            fields,
        })
    }
}

impl Record for Comment {
    fn id(&self) -> u64 {
        self.id
    }
}

fn as_object(input: Value) -> Result<Map<String, Value>, AppError> {
    match input {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Validation("expected a JSON object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::{Blog, Comment, NewUser, PublicUser, UserUpdate};
    use serde_json::{Value, json};

    #[test]
    fn new_user_drops_unrecognized_fields() {
        let new_user = NewUser::from_input(json!({
            "username": "bob",
            "password": "x",
            "role": "admin",
            "is_superuser": true
        }))
        .unwrap();

        let user = new_user.into_user(1);
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("role").is_none());
        assert!(value.get("is_superuser").is_none());
    }

    #[test]
    fn new_user_requires_username_and_password() {
        assert!(NewUser::from_input(json!({ "password": "x" })).is_err());
        assert!(NewUser::from_input(json!({ "username": "bob" })).is_err());
        assert!(NewUser::from_input(json!({ "username": "  ", "password": "x" })).is_err());
        assert!(NewUser::from_input(json!({ "username": "bob", "password": "" })).is_err());
    }

    #[test]
    fn public_user_has_no_password() {
        let user = NewUser::from_input(json!({ "username": "bob", "password": "secret" }))
            .unwrap()
            .into_user(7);

        let value = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["id"], 7);
        assert_eq!(value["username"], "bob");
    }

    #[test]
    fn blog_preserves_arbitrary_fields_but_not_client_id() {
        let blog = Blog::from_input(json!({ "id": 99, "title": "A", "stars": 3 }), 1).unwrap();
        let value = serde_json::to_value(&blog).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["title"], "A");
        assert_eq!(value["stars"], 3);
    }

    #[test]
    fn blog_rejects_non_object_input() {
        assert!(Blog::from_input(Value::String("title".into()), 1).is_err());
    }

    #[test]
    fn comment_requires_integer_blog_id() {
        assert!(Comment::from_input(json!({ "text": "hi" }), 1).is_err());
        assert!(Comment::from_input(json!({ "blogId": "two", "text": "hi" }), 1).is_err());

        let comment = Comment::from_input(json!({ "blogId": 2, "text": "hi" }), 1).unwrap();
        assert_eq!(comment.blog_id, 2);
        let value = serde_json::to_value(&comment).unwrap();
        assert_eq!(value["blogId"], 2);
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let mut user = NewUser::from_input(json!({
            "username": "bob",
            "password": "x",
            "email": "bob@example.com"
        }))
        .unwrap()
        .into_user(1);

        let update = UserUpdate::from_input(json!({ "name": "Bob" })).unwrap();
        update.apply(&mut user);

        assert_eq!(user.name, "Bob");
        assert_eq!(user.username, "bob");
        assert_eq!(user.password, "x");
        assert_eq!(user.email, "bob@example.com");
    }
}
