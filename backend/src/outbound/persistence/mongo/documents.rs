//! Stored document shapes and their translation to domain records.
//!
//! Timestamps use BSON dates; identifiers are stored as strings in `_id`.

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Comment, Component, ComponentCategory, Course, CourseLevel, CourseSlug, Email, Order,
    OrderItem, OrderStatus, Price, Product, Profile, Project, ProjectStep, Role, Section,
    ShippingAddress, User, UserId, Username, Visibility,
};

/// Failure translating a stored document into a domain record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {collection} document {id} is invalid: {reason}")]
pub(super) struct CorruptDocument {
    collection: &'static str,
    id: String,
    reason: String,
}

impl CorruptDocument {
    fn new(collection: &'static str, id: &str, reason: impl ToString) -> Self {
        Self {
            collection,
            id: id.to_owned(),
            reason: reason.to_string(),
        }
    }
}

fn to_bson_date(value: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(value.timestamp_millis())
}

fn from_bson_date(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

fn user_id(collection: &'static str, doc_id: &str, raw: &str) -> Result<UserId, CorruptDocument> {
    UserId::new(raw).map_err(|err| CorruptDocument::new(collection, doc_id, err))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub profile: Profile,
    pub language_preference: String,
    pub created_at: BsonDateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            points: user.points,
            badges: user.badges.clone(),
            profile: user.profile.clone(),
            language_preference: user.language_preference.clone(),
            created_at: to_bson_date(user.created_at),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = CorruptDocument;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| CorruptDocument::new("user", &doc.id, reason);
        Ok(Self {
            id: user_id("user", &doc.id, &doc.id)?,
            username: Username::new(&doc.username).map_err(|e| corrupt(e.to_string()))?,
            email: Email::new(&doc.email).map_err(|e| corrupt(e.to_string()))?,
            password_hash: doc.password_hash,
            role: doc.role,
            points: doc.points,
            badges: doc.badges,
            profile: doc.profile,
            language_preference: doc.language_preference,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CourseDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub visible_on_home: bool,
    pub visible_on_catalog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: BsonDateTime,
}

impl From<&Course> for CourseDocument {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            course_id: course.course_id.as_str().to_owned(),
            title: course.title.clone(),
            description: course.description.clone(),
            level: course.level,
            duration: course.duration.clone(),
            image_url: course.image_url.clone(),
            sections: course.sections.clone(),
            visible_on_home: course.visibility.visible_on_home,
            visible_on_catalog: course.visibility.visible_on_catalog,
            created_by: course.created_by.as_ref().map(ToString::to_string),
            created_at: to_bson_date(course.created_at),
        }
    }
}

impl TryFrom<CourseDocument> for Course {
    type Error = CorruptDocument;

    fn try_from(doc: CourseDocument) -> Result<Self, Self::Error> {
        let course_id = CourseSlug::parse(doc.course_id.as_str())
            .map_err(|err| CorruptDocument::new("course", &doc.id, err))?;
        let created_by = doc
            .created_by
            .as_deref()
            .map(|raw| user_id("course", &doc.id, raw))
            .transpose()?;
        Ok(Self {
            id: doc.id,
            course_id,
            title: doc.title,
            description: doc.description,
            level: doc.level,
            duration: doc.duration,
            image_url: doc.image_url,
            sections: doc.sections,
            visibility: Visibility {
                visible_on_home: doc.visible_on_home,
                visible_on_catalog: doc.visible_on_catalog,
            },
            created_by,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ComponentDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: ComponentCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub visible_on_home: bool,
    pub visible_on_catalog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: BsonDateTime,
}

impl From<&Component> for ComponentDocument {
    fn from(component: &Component) -> Self {
        Self {
            id: component.id.clone(),
            name: component.name.clone(),
            category: component.category,
            description: component.description.clone(),
            image_url: component.image_url.clone(),
            visible_on_home: component.visibility.visible_on_home,
            visible_on_catalog: component.visibility.visible_on_catalog,
            created_by: component.created_by.as_ref().map(ToString::to_string),
            created_at: to_bson_date(component.created_at),
        }
    }
}

impl TryFrom<ComponentDocument> for Component {
    type Error = CorruptDocument;

    fn try_from(doc: ComponentDocument) -> Result<Self, Self::Error> {
        let created_by = doc
            .created_by
            .as_deref()
            .map(|raw| user_id("component", &doc.id, raw))
            .transpose()?;
        Ok(Self {
            id: doc.id,
            name: doc.name,
            category: doc.category,
            description: doc.description,
            image_url: doc.image_url,
            visibility: Visibility {
                visible_on_home: doc.visible_on_home,
                visible_on_catalog: doc.visible_on_catalog,
            },
            created_by,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub visible_on_home: bool,
    pub visible_on_catalog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: BsonDateTime,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.value(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            visible_on_home: product.visibility.visible_on_home,
            visible_on_catalog: product.visibility.visible_on_catalog,
            created_by: product.created_by.as_ref().map(ToString::to_string),
            created_at: to_bson_date(product.created_at),
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = CorruptDocument;

    fn try_from(doc: ProductDocument) -> Result<Self, Self::Error> {
        let price =
            Price::new(doc.price).map_err(|err| CorruptDocument::new("product", &doc.id, err))?;
        let created_by = doc
            .created_by
            .as_deref()
            .map(|raw| user_id("product", &doc.id, raw))
            .transpose()?;
        Ok(Self {
            id: doc.id,
            name: doc.name,
            price,
            description: doc.description,
            image_url: doc.image_url,
            visibility: Visibility {
                visible_on_home: doc.visible_on_home,
                visible_on_catalog: doc.visible_on_catalog,
            },
            created_by,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommentDocument {
    pub author: String,
    pub text: String,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<ProjectStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: Vec<CommentDocument>,
    pub created_at: BsonDateTime,
}

impl From<&Project> for ProjectDocument {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            steps: project.steps.clone(),
            image_url: project.image_url.clone(),
            author: project.author.to_string(),
            likes: project.likes,
            comments: project
                .comments
                .iter()
                .map(|c| CommentDocument {
                    author: c.author.to_string(),
                    text: c.text.clone(),
                    created_at: to_bson_date(c.created_at),
                })
                .collect(),
            created_at: to_bson_date(project.created_at),
        }
    }
}

impl TryFrom<ProjectDocument> for Project {
    type Error = CorruptDocument;

    fn try_from(doc: ProjectDocument) -> Result<Self, Self::Error> {
        let author = user_id("project", &doc.id, &doc.author)?;
        let comments = doc
            .comments
            .into_iter()
            .map(|c| {
                Ok(Comment {
                    author: user_id("project", &doc.id, &c.author)?,
                    text: c.text,
                    created_at: from_bson_date(c.created_at),
                })
            })
            .collect::<Result<Vec<_>, CorruptDocument>>()?;
        Ok(Self {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            steps: doc.steps,
            image_url: doc.image_url,
            author,
            likes: doc.likes,
            comments,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrderItemDocument {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrderDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub items: Vec<OrderItemDocument>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: BsonDateTime,
}

impl From<&Order> for OrderDocument {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            user: order.user.to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemDocument {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.value(),
                })
                .collect(),
            total_price: order.total_price,
            status: order.status,
            shipping_address: order.shipping_address.clone(),
            created_at: to_bson_date(order.created_at),
        }
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = CorruptDocument;

    fn try_from(doc: OrderDocument) -> Result<Self, Self::Error> {
        let user = user_id("order", &doc.id, &doc.user)?;
        let items = doc
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderItem {
                    unit_price: Price::new(item.unit_price)
                        .map_err(|err| CorruptDocument::new("order", &doc.id, err))?,
                    product_id: item.product_id,
                    name: item.name,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, CorruptDocument>>()?;
        Ok(Self {
            id: doc.id,
            user,
            items,
            total_price: doc.total_price,
            status: doc.status,
            shipping_address: doc.shipping_address,
            created_at: from_bson_date(doc.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lesson;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample_course() -> Course {
        Course {
            id: "c-1".to_owned(),
            course_id: CourseSlug::parse("rust-101").expect("slug"),
            title: "Rust".to_owned(),
            description: "desc".to_owned(),
            level: CourseLevel::Advanced,
            duration: "1h".to_owned(),
            image_url: None,
            sections: vec![Section {
                title: "S1".to_owned(),
                lessons: vec![Lesson {
                    title: "L1".to_owned(),
                    content: "C1".to_owned(),
                    video_url: Some("https://v.test/1".to_owned()),
                }],
            }],
            visibility: Visibility {
                visible_on_home: true,
                visible_on_catalog: false,
            },
            created_by: Some(UserId::random()),
            created_at: Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("time"),
        }
    }

    #[rstest]
    fn course_document_uses_stored_field_names() {
        let doc = mongodb::bson::to_document(&CourseDocument::from(&sample_course()))
            .expect("encode");
        assert_eq!(doc.get_str("_id").ok(), Some("c-1"));
        assert_eq!(doc.get_str("courseId").ok(), Some("rust-101"));
        assert_eq!(doc.get_str("level").ok(), Some("advanced"));
        assert_eq!(doc.get_bool("visibleOnHome").ok(), Some(true));
        assert!(doc.get_datetime("createdAt").is_ok());
    }

    #[rstest]
    fn course_survives_document_translation() {
        let course = sample_course();
        let doc = mongodb::bson::to_document(&CourseDocument::from(&course)).expect("encode");
        let decoded: CourseDocument = mongodb::bson::from_document(doc).expect("decode");
        assert_eq!(Course::try_from(decoded).expect("valid"), course);
    }

    #[rstest]
    fn corrupt_slugs_are_reported() {
        let mut doc = CourseDocument::from(&sample_course());
        doc.course_id = "Not A Slug".to_owned();
        let err = Course::try_from(doc).expect_err("corrupt");
        assert!(err.to_string().contains("course document c-1"));
    }
}
