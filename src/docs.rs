//! OpenAPI document for every resource, built from the catalogue, plus the Swagger UI page that renders it.

use crate::config::AppConfig;
use crate::resource::{Column, ColumnKind, Resource};
use crate::routes::resource_prefix;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ArrayBuilder, KnownFormat, ObjectBuilder, SchemaFormat, Type};
use utoipa::openapi::{
    ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, RefOr, Required,
    ResponseBuilder, Schema, ServerBuilder,
};
use utoipa::openapi::tag::TagBuilder;

pub const OPENAPI_PATH: &str = "/docs/openapi.json";

fn schema_ref(schema: ObjectBuilder) -> RefOr<Schema> {
    RefOr::T(Schema::Object(schema.build()))
}

fn column_schema(column: &Column) -> ObjectBuilder {
    let schema = ObjectBuilder::new();
    match column.kind {
        ColumnKind::Text => schema.schema_type(Type::String),
        ColumnKind::Integer => schema.schema_type(Type::Integer),
        ColumnKind::Float => schema.schema_type(Type::Number),
        ColumnKind::Boolean => schema.schema_type(Type::Boolean),
        ColumnKind::Timestamp => schema
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))),
        ColumnKind::Enum(e) => schema
            .schema_type(Type::String)
            .enum_values(Some(e.values.iter().copied())),
    }
}

/// Request body schema; `required` lists the mandatory fields (create only).
fn body_schema(resource: Resource, with_required: bool) -> ObjectBuilder {
    resource
        .columns()
        .iter()
        .fold(ObjectBuilder::new().schema_type(Type::Object), |schema, column| {
            let schema = schema.property(column.name, schema_ref(column_schema(column)));
            if with_required && column.required {
                schema.required(column.name)
            } else {
                schema
            }
        })
}

fn record_schema(resource: Resource) -> ObjectBuilder {
    ["id", "createdAt", "updatedAt"].into_iter().fold(
        body_schema(resource, false).required("id"),
        |schema, field| {
            let s = ObjectBuilder::new().schema_type(Type::String);
            let s = if field == "id" {
                s
            } else {
                s.format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime)))
            };
            schema.property(field, schema_ref(s))
        },
    )
}

fn error_response(description: &str) -> utoipa::openapi::Response {
    let schema = ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("error", schema_ref(ObjectBuilder::new().schema_type(Type::String)))
        .required("error");
    json_response(description, schema_ref(schema))
}

fn json_response(description: &str, schema: RefOr<Schema>) -> utoipa::openapi::Response {
    ResponseBuilder::new()
        .description(description)
        .content("application/json", ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn id_parameter() -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(schema_ref(ObjectBuilder::new().schema_type(Type::String))))
        .build()
}

fn json_body(schema: ObjectBuilder) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content("application/json", ContentBuilder::new().schema(Some(schema_ref(schema))).build())
        .required(Some(Required::True))
        .build()
}

fn resource_paths(resource: Resource, paths: PathsBuilder) -> PathsBuilder {
    let tag = resource.tag();
    let one = resource.singular();
    let many = resource.plural();
    let operation = |summary: String| OperationBuilder::new().summary(Some(summary)).tag(tag.clone());

    let list = operation(format!("Get all {}", many))
        .operation_id(Some(format!("list_{}", resource.table())))
        .response(
            "200",
            json_response(
                &format!("List of {}", many),
                RefOr::T(Schema::Array(
                    ArrayBuilder::new().items(schema_ref(record_schema(resource))).build(),
                )),
            ),
        )
        .response("500", error_response("Failed to fetch items"))
        .build();
    let create = operation(format!("Create a new {}", one))
        .operation_id(Some(format!("create_{}", resource.table())))
        .request_body(Some(json_body(body_schema(resource, true))))
        .response("201", json_response(&format!("Created {}", one), schema_ref(record_schema(resource))))
        .response("500", error_response("Failed to create item"))
        .build();
    let read = operation(format!("Get a {} by ID", one))
        .operation_id(Some(format!("get_{}", resource.table())))
        .parameter(id_parameter())
        .response("200", json_response(&format!("{} found", one), schema_ref(record_schema(resource))))
        .response("404", error_response("Item not found"))
        .response("500", error_response("Failed to fetch item"))
        .build();
    let update = operation(format!("Update a {}", one))
        .operation_id(Some(format!("update_{}", resource.table())))
        .parameter(id_parameter())
        .request_body(Some(json_body(body_schema(resource, false))))
        .response("200", json_response(&format!("Updated {}", one), schema_ref(record_schema(resource))))
        .response("500", error_response("Failed to update item"))
        .build();
    let delete = operation(format!("Delete a {}", one))
        .operation_id(Some(format!("delete_{}", resource.table())))
        .parameter(id_parameter())
        .response("204", ResponseBuilder::new().description(format!("Deleted {}", one)).build())
        .response("500", error_response("Failed to delete item"))
        .build();

    let prefix = resource_prefix(resource);
    paths
        .path(
            prefix.clone(),
            PathItemBuilder::new()
                .operation(HttpMethod::Get, list)
                .operation(HttpMethod::Post, create)
                .build(),
        )
        .path(
            format!("{}/{{id}}", prefix),
            PathItemBuilder::new()
                .operation(HttpMethod::Get, read)
                .operation(HttpMethod::Put, update)
                .operation(HttpMethod::Delete, delete)
                .build(),
        )
}

/// The full API description served at `/docs/openapi.json`.
pub fn openapi(config: &AppConfig) -> OpenApi {
    let paths = Resource::ALL
        .into_iter()
        .fold(PathsBuilder::new(), |paths, resource| resource_paths(resource, paths));
    let tags = Resource::ALL
        .into_iter()
        .map(|r| TagBuilder::new().name(r.tag()).build())
        .collect::<Vec<_>>();
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Kitch-Katch API")
                .version("1.0.0")
                .description(Some("API documentation for Kitch-Katch application"))
                .build(),
        )
        .servers(Some(vec![ServerBuilder::new()
            .url(config.public_url.clone())
            .description(Some(config.server_description()))
            .build()]))
        .paths(paths.build())
        .tags(Some(tags))
        .build()
}

/// Swagger UI page loading the document from `OPENAPI_PATH`.
pub fn swagger_ui_html() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Kitch-Katch API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##,
        OPENAPI_PATH
    )
}
