//! MongoDB-backed `UserRepository`.

use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::doc;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Email, User, UserId, Username};

use super::documents::UserDocument;
use super::errors::{duplicate_key_message, map_basic_mongo_error};
use super::{MongoStore, USERS};

/// User accounts stored in the `users` collection.
#[derive(Clone, Debug)]
pub struct MongoUserRepository {
    users: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Bind to the `users` collection of `store`.
    #[must_use]
    pub fn new(store: &MongoStore) -> Self {
        Self {
            users: store.database().collection(USERS),
        }
    }

    async fn find_one(
        &self,
        filter: mongodb::bson::Document,
    ) -> Result<Option<User>, UserRepositoryError> {
        let found = self
            .users
            .find_one(filter)
            .await
            .map_err(|err| map_err(&err))?;
        found
            .map(User::try_from)
            .transpose()
            .map_err(|err| UserRepositoryError::query(err.to_string()))
    }
}

fn map_err(error: &mongodb::error::Error) -> UserRepositoryError {
    map_basic_mongo_error(error, UserRepositoryError::query, UserRepositoryError::connection)
}

/// Pick the violated key from the index name in the driver message.
fn duplicate_field(message: &str) -> &'static str {
    if message.contains("email") {
        "email"
    } else {
        "username"
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        match self.users.insert_one(UserDocument::from(user)).await {
            Ok(_) => Ok(()),
            Err(err) => match duplicate_key_message(&err) {
                Some(message) => Err(UserRepositoryError::duplicate(duplicate_field(message))),
                None => Err(map_err(&err)),
            },
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(doc! { "_id": id.as_ref() }).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(doc! { "email": email.as_str() }).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(doc! { "username": username.as_str() }).await
    }
}

#[cfg(test)]
mod tests {
    use super::duplicate_field;
    use rstest::rstest;

    #[rstest]
    #[case(
        "E11000 duplicate key error collection: courseware.users index: email_1 dup key",
        "email"
    )]
    #[case(
        "E11000 duplicate key error collection: courseware.users index: username_1 dup key",
        "username"
    )]
    fn duplicate_field_follows_index_name(#[case] message: &str, #[case] expected: &str) {
        assert_eq!(duplicate_field(message), expected);
    }
}
