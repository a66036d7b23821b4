//! Component, product and project handlers.
//!
//! ```text
//! POST  /api/components/create   name, category, description?, image?
//! GET   /api/components          ?category&visibleOnHome&visibleOnCatalog
//! PATCH /api/components/{id}
//! POST  /api/products/create     name, price, description, image? | imageUrl?
//! GET   /api/products            ?visibleOnHome&visibleOnCatalog
//! PATCH /api/products/{id}
//! POST  /api/projects/create     title, description, steps?, image?
//! GET   /api/projects
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    Component, ComponentCategory, ComponentFields, ComponentFilter, ComponentSubmission, Product,
    ProductFields, ProductSubmission, Project, ProjectFields, ProjectSubmission,
    VisibilityFilter, VisibilityPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::form::FormData;
use crate::inbound::http::schemas::{
    ComponentSchema, ErrorSchema, ProductSchema, ProjectSchema, VisibilityPatchSchema,
};
use crate::inbound::http::state::HttpState;

/// Form field carrying the optional image on every create endpoint.
const IMAGE_FIELD: &str = "image";

/// Query accepted by `GET /api/components`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ComponentListQuery {
    /// `sensor`, `actuator`, `microcontroller` or `sbc`.
    pub category: Option<String>,
    pub visible_on_home: Option<bool>,
    pub visible_on_catalog: Option<bool>,
}

/// Query accepted by `GET /api/products`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductListQuery {
    pub visible_on_home: Option<bool>,
    pub visible_on_catalog: Option<bool>,
}

impl ComponentListQuery {
    fn into_filter(self) -> ApiResult<ComponentFilter> {
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<ComponentCategory>)
            .transpose()?;
        Ok(ComponentFilter {
            category,
            visibility: VisibilityFilter {
                visible_on_home: self.visible_on_home,
                visible_on_catalog: self.visible_on_catalog,
            },
        })
    }
}

impl From<ProductListQuery> for VisibilityFilter {
    fn from(query: ProductListQuery) -> Self {
        Self {
            visible_on_home: query.visible_on_home,
            visible_on_catalog: query.visible_on_catalog,
        }
    }
}

async fn read_form(
    state: &HttpState,
    req: &HttpRequest,
    payload: web::Payload,
) -> ApiResult<FormData> {
    FormData::read(req, payload, state.options.max_upload_bytes).await
}

/// Add a hardware component.
#[utoipa::path(
    post,
    path = "/api/components/create",
    request_body(content_type = "multipart/form-data", description = "name, category, description and an optional `image` file"),
    responses(
        (status = 201, description = "Component created", body = ComponentSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Image upload failed", body = ErrorSchema)
    ),
    tags = ["components"],
    operation_id = "createComponent"
)]
#[post("/create")]
pub async fn create_component(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let mut form = read_form(&state, &req, payload).await?;
    let submission = ComponentSubmission::try_from_parts(&ComponentFields {
        name: form.text("name"),
        category: form.text("category"),
        description: form.text("description"),
    })?;
    let image = form.take_file(IMAGE_FIELD);
    let component = state
        .catalogue
        .create_component(submission, image, auth.claims())
        .await?;
    Ok(HttpResponse::Created().json(component))
}

/// List components in insertion order.
#[utoipa::path(
    get,
    path = "/api/components",
    params(ComponentListQuery),
    responses(
        (status = 200, description = "Matching components", body = [ComponentSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["components"],
    operation_id = "listComponents",
    security([])
)]
#[get("")]
pub async fn list_components(
    state: web::Data<HttpState>,
    query: web::Query<ComponentListQuery>,
) -> ApiResult<web::Json<Vec<Component>>> {
    let filter = query.into_inner().into_filter()?;
    state.catalogue.list_components(&filter).await.map(web::Json)
}

/// Toggle a component's visibility flags.
#[utoipa::path(
    patch,
    path = "/api/components/{id}",
    params(("id" = String, Path, description = "Component record id")),
    request_body = VisibilityPatchSchema,
    responses(
        (status = 200, description = "Updated component", body = ComponentSchema),
        (status = 400, description = "Empty patch", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such component", body = ErrorSchema)
    ),
    tags = ["components"],
    operation_id = "patchComponent"
)]
#[patch("/{id}")]
pub async fn patch_component(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    path: web::Path<String>,
    patch: web::Json<VisibilityPatch>,
) -> ApiResult<web::Json<Component>> {
    state
        .catalogue
        .update_component_visibility(&path.into_inner(), &patch.into_inner())
        .await
        .map(web::Json)
}

/// Add a marketplace product.
///
/// An uploaded `image` wins over an `imageUrl` text field.
#[utoipa::path(
    post,
    path = "/api/products/create",
    request_body(content_type = "multipart/form-data", description = "name, price, description and either an `image` file or an `imageUrl`"),
    responses(
        (status = 201, description = "Product created", body = ProductSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Image upload failed", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/create")]
pub async fn create_product(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let mut form = read_form(&state, &req, payload).await?;
    let submission = ProductSubmission::try_from_parts(&ProductFields {
        name: form.text("name"),
        price: form.text("price"),
        description: form.text("description"),
        image_url: form.text("imageUrl"),
    })?;
    let image = form.take_file(IMAGE_FIELD);
    let product = state
        .catalogue
        .create_product(submission, image, auth.claims())
        .await?;
    Ok(HttpResponse::Created().json(product))
}

/// List products in insertion order.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Matching products", body = [ProductSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<web::Json<Vec<Product>>> {
    let filter = VisibilityFilter::from(query.into_inner());
    state.catalogue.list_products(&filter).await.map(web::Json)
}

/// Toggle a product's visibility flags.
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product record id")),
    request_body = VisibilityPatchSchema,
    responses(
        (status = 200, description = "Updated product", body = ProductSchema),
        (status = 400, description = "Empty patch", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "patchProduct"
)]
#[patch("/{id}")]
pub async fn patch_product(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    path: web::Path<String>,
    patch: web::Json<VisibilityPatch>,
) -> ApiResult<web::Json<Product>> {
    state
        .catalogue
        .update_product_visibility(&path.into_inner(), &patch.into_inner())
        .await
        .map(web::Json)
}

/// Share a community project. The caller becomes its author.
#[utoipa::path(
    post,
    path = "/api/projects/create",
    request_body(content_type = "multipart/form-data", description = "title, description, steps (JSON array) and an optional `image` file"),
    responses(
        (status = 201, description = "Project created", body = ProjectSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Image upload failed", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/create")]
pub async fn create_project(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let mut form = read_form(&state, &req, payload).await?;
    let submission = ProjectSubmission::try_from_parts(&ProjectFields {
        title: form.text("title"),
        description: form.text("description"),
        steps: form.text("steps"),
    })?;
    let image = form.take_file(IMAGE_FIELD);
    let project = state
        .catalogue
        .create_project(submission, image, auth.claims())
        .await?;
    Ok(HttpResponse::Created().json(project))
}

/// List every project in insertion order.
#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, description = "All projects", body = [ProjectSchema])),
    tags = ["projects"],
    operation_id = "listProjects",
    security([])
)]
#[get("")]
pub async fn list_projects(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Project>>> {
    state.catalogue.list_projects().await.map(web::Json)
}

#[cfg(test)]
mod tests;
