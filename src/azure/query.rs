//! Search and suggest bodies for the Azure REST API.

use serde_json::{Map, Value, json};

use crate::azure::filter::render_filters;
use crate::config::SearchServiceConfig;
use crate::error::SchemaError;
use crate::request::{FacetInfoRequest, SearchRequest};
use crate::schema::ModelSchema;

/// Build the body of a `docs/search` call.
///
/// `schema` describes the indexed model and `projection` the record type
/// whose members are selected.
pub fn build_search_body(
    schema: &ModelSchema,
    projection: &ModelSchema,
    request: &SearchRequest,
    config: &SearchServiceConfig,
) -> Result<Value, SchemaError> {
    let mut body = Map::new();
    body.insert("search".to_string(), json!(request.search_text));
    body.insert("searchMode".to_string(), json!("any"));
    body.insert("queryType".to_string(), json!("full"));
    body.insert("count".to_string(), json!(true));
    body.insert("top".to_string(), json!(request.limit));
    body.insert("skip".to_string(), json!(request.offset));
    body.insert("select".to_string(), json!(projection.selectable_paths().join(",")));

    body.insert("highlightPreTag".to_string(), json!(config.highlight_pre_tag));
    body.insert("highlightPostTag".to_string(), json!(config.highlight_post_tag));
    if !request.fields_to_highlight.is_empty() {
        body.insert("highlight".to_string(), json!(request.fields_to_highlight.join(",")));
    }

    if !request.facet_info_to_return.is_empty() {
        let facets: Vec<String> = request.facet_info_to_return.iter().map(facet_expression).collect();
        body.insert("facets".to_string(), json!(facets));
    }

    if !request.order_by.is_empty() {
        let order_by: Vec<String> = request
            .order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field.replace('.', "/"), order))
            .collect();
        body.insert("orderby".to_string(), json!(order_by.join(",")));
    }

    if let Some(filter) = render_filters(schema, &request.filters)? {
        body.insert("filter".to_string(), json!(filter));
    }

    if let Some(profile) = request.scoring_profile.as_deref().filter(|p| !p.is_empty()) {
        body.insert("scoringProfile".to_string(), json!(profile));
    }

    Ok(Value::Object(body))
}

/// Facet parameter: explicit bucket values, or count and sort.
pub fn facet_expression(facet: &FacetInfoRequest) -> String {
    let name = facet.facet_name.replace('.', "/");
    if facet.values.is_empty() {
        format!("{name},count:{},sort:{}", facet.count, facet.sort)
    } else {
        let values: Vec<String> = facet.values.iter().map(f64::to_string).collect();
        format!("{name},values:{}", values.join("|"))
    }
}

/// Build the body of a `docs/suggest` call.
pub fn build_suggest_body(
    schema: &ModelSchema,
    search_text: &str,
    suggester_name: &str,
    fuzzy: bool,
    config: &SearchServiceConfig,
) -> Value {
    json!({
        "search": search_text,
        "suggesterName": suggester_name,
        "fuzzy": fuzzy,
        "top": config.suggestion_top,
        "highlightPreTag": config.highlight_pre_tag,
        "highlightPostTag": config.highlight_post_tag,
        "select": schema.selectable_paths().join(","),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterNode, FilterOperator};
    use crate::request::SortOrder;
    use crate::schema::{MemberDescriptor, SearchableProperty, TypeDescriptor};

    fn schema() -> ModelSchema {
        ModelSchema::builder("Product")
            .index_name("products")
            .property("Id", TypeDescriptor::string(), SearchableProperty::new().key(true))
            .property("Name", TypeDescriptor::string(), SearchableProperty::new().searchable(true))
            .property("Price", TypeDescriptor::double(), SearchableProperty::new().filterable(true))
            .member(MemberDescriptor::property("Internal", TypeDescriptor::string()).ignored(true))
            .build()
            .unwrap()
    }

    #[test]
    fn test_search_body() {
        let schema = schema();
        let request = SearchRequest::new()
            .with_search_text("shoes")
            .with_limit(10)
            .with_offset(20)
            .with_order_by("Price", SortOrder::Desc)
            .with_highlight("Name")
            .with_scoring_profile("boosted")
            .with_filter(FilterNode::new("Price", FilterOperator::Gt, 10));

        let body = build_search_body(&schema, &schema, &request, &SearchServiceConfig::default()).unwrap();

        assert_eq!(body["search"], "shoes");
        assert_eq!(body["searchMode"], "any");
        assert_eq!(body["queryType"], "full");
        assert_eq!(body["count"], true);
        assert_eq!(body["top"], 10);
        assert_eq!(body["skip"], 20);
        assert_eq!(body["select"], "Id,Name,Price");
        assert_eq!(body["highlight"], "Name");
        assert_eq!(body["highlightPreTag"], "<span class=\"highlight\">");
        assert_eq!(body["orderby"], "Price desc");
        assert_eq!(body["filter"], "(Price gt 10)");
        assert_eq!(body["scoringProfile"], "boosted");
    }

    #[test]
    fn test_minimal_body_omits_optional_parameters() {
        let schema = schema();
        let body = build_search_body(&schema, &schema, &SearchRequest::new(), &SearchServiceConfig::default()).unwrap();

        assert_eq!(body["search"], "*");
        for key in ["highlight", "facets", "orderby", "filter", "scoringProfile"] {
            assert!(body.get(key).is_none(), "unexpected {key}");
        }
    }

    #[test]
    fn test_facet_expression() {
        let facet = FacetInfoRequest::new("Brand").with_count(5);
        assert_eq!(facet_expression(&facet), "Brand,count:5,sort:count");

        let facet = FacetInfoRequest::new("Items.Price").with_values([10.0, 20.5]);
        assert_eq!(facet_expression(&facet), "Items/Price,values:10|20.5");
    }

    #[test]
    fn test_suggest_body() {
        let schema = schema();
        let config = SearchServiceConfig::default().with_suggestion_top(3);
        let body = build_suggest_body(&schema, "sho", "sg", true, &config);

        assert_eq!(body["suggesterName"], "sg");
        assert_eq!(body["fuzzy"], true);
        assert_eq!(body["top"], 3);
        assert_eq!(body["select"], "Id,Name,Price");
    }
}
