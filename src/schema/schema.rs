//! Model schemas and property path resolution.

use serde::Serialize;

use crate::error::SchemaError;
use crate::schema::field::{MemberDescriptor, SearchableProperty, TypeDescriptor, ValueKind};

/// A type that can be searched, described by a static schema.
///
/// The schema is built once and shared for the life of the program:
///
/// ```
/// use lazy_static::lazy_static;
/// use querybridge::schema::{
///     MemberDescriptor, ModelSchema, SearchableModel, SearchableProperty, TypeDescriptor,
/// };
///
/// struct Product;
///
/// lazy_static! {
///     static ref PRODUCT_SCHEMA: ModelSchema = ModelSchema::builder("Product")
///         .index_name("products")
///         .member(
///             MemberDescriptor::property("Id", TypeDescriptor::string())
///                 .with_attributes(SearchableProperty::new().key(true)),
///         )
///         .build()
///         .expect("valid schema");
/// }
///
/// impl SearchableModel for Product {
///     fn schema() -> &'static ModelSchema {
///         &PRODUCT_SCHEMA
///     }
/// }
///
/// assert_eq!(Product::schema().key_property_name(), Some("Id"));
/// ```
pub trait SearchableModel {
    /// Get the schema describing this model.
    fn schema() -> &'static ModelSchema;
}

/// Schema of a searchable model: its index and ordered members.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    name: String,
    index_name: Option<String>,
    members: Vec<MemberDescriptor>,
}

impl ModelSchema {
    /// Create a builder for a model with the given name.
    pub fn builder<S: Into<String>>(name: S) -> ModelSchemaBuilder {
        ModelSchemaBuilder::new(name)
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the declared index name.
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    /// Get all members in declaration order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Get a member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Name of the key property, if any.
    pub fn key_property_name(&self) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.has_attribute(|a| a.is_key))
            .map(|m| m.name())
    }

    /// Properties whose attributes match `flag`, in declaration order.
    fn properties_where(
        &self,
        flag: impl Fn(&SearchableProperty) -> bool,
    ) -> Vec<(&str, &SearchableProperty)> {
        self.members
            .iter()
            .filter_map(|m| m.attributes().map(|a| (m.name(), a)))
            .filter(|(_, a)| flag(a))
            .collect()
    }

    pub fn facetable_properties(&self) -> Vec<(&str, &SearchableProperty)> {
        self.properties_where(|a| a.is_facetable)
    }

    pub fn facetable_property_names(&self) -> Vec<&str> {
        self.facetable_properties().into_iter().map(|(n, _)| n).collect()
    }

    pub fn searchable_properties(&self) -> Vec<(&str, &SearchableProperty)> {
        self.properties_where(|a| a.is_searchable)
    }

    pub fn searchable_property_names(&self) -> Vec<&str> {
        self.searchable_properties().into_iter().map(|(n, _)| n).collect()
    }

    pub fn filterable_properties(&self) -> Vec<(&str, &SearchableProperty)> {
        self.properties_where(|a| a.is_filterable)
    }

    pub fn sortable_properties(&self) -> Vec<(&str, &SearchableProperty)> {
        self.properties_where(|a| a.is_sortable)
    }

    pub fn suggestion_properties(&self) -> Vec<(&str, &SearchableProperty)> {
        self.properties_where(|a| a.use_for_suggestions)
    }

    /// Resolve a dotted property path to the value kind used for literal encoding.
    ///
    /// Each segment's declared type has its nullable and list wrappers removed,
    /// outermost first, before the next segment is looked up in the nested
    /// object schema. Enum members resolve to [`ValueKind::Int`].
    pub fn resolve_value_kind(&self, path: &str) -> Result<ValueKind, SchemaError> {
        let (owner, member) = self.resolve_member(path)?;
        let ty = accessible_type(owner, member)?;

        ty.value_kind().ok_or_else(|| SchemaError::NotAValue {
            path: path.to_string(),
            model: self.name.clone(),
        })
    }

    /// Attributes of the member a dotted path ends on.
    pub fn property(&self, path: &str) -> Result<Option<&SearchableProperty>, SchemaError> {
        let (_, member) = self.resolve_member(path)?;
        Ok(member.attributes())
    }

    /// Walk a dotted path, returning the member it ends on and the schema owning it.
    fn resolve_member(&self, path: &str) -> Result<(&ModelSchema, &MemberDescriptor), SchemaError> {
        if path.is_empty() {
            return Err(SchemaError::EmptyPath {
                model: self.name.clone(),
            });
        }

        let mut schema = self;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return Err(SchemaError::EmptyPath {
                    model: schema.name.clone(),
                });
            }

            let member = schema
                .member(segment)
                .ok_or_else(|| SchemaError::unknown_member(segment, &schema.name))?;

            let Some(next) = segments.peek() else {
                return Ok((schema, member));
            };

            let ty = accessible_type(schema, member)?;
            schema = ty.object_schema().ok_or_else(|| {
                SchemaError::unknown_member(*next, format!("{}.{}", schema.name, segment))
            })?;
        }

        Err(SchemaError::EmptyPath {
            model: self.name.clone(),
        })
    }

    /// Member paths that can be selected from a document.
    ///
    /// Nested object members are expanded into `outer/inner` paths.
    pub fn selectable_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_selectable("", &mut paths, 0);
        paths
    }

    fn collect_selectable(&self, prefix: &str, paths: &mut Vec<String>, depth: usize) {
        for member in self.members.iter().filter(|m| m.is_selectable()) {
            let path = format!("{prefix}{}", member.name());
            let nested = member
                .type_descriptor()
                .and_then(TypeDescriptor::object_schema)
                .filter(|_| depth < MAX_SELECT_DEPTH);

            match nested {
                Some(schema) => schema.collect_selectable(&format!("{path}/"), paths, depth + 1),
                None => paths.push(path),
            }
        }
    }

    /// Summary of the schema, for diagnostics.
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            name: self.name.clone(),
            index_name: self.index_name.clone(),
            key: self.key_property_name().map(str::to_string),
            members: self.members.iter().map(|m| m.name().to_string()).collect(),
        }
    }
}

// Self-referencing models stop expanding here.
const MAX_SELECT_DEPTH: usize = 8;

fn accessible_type<'a>(
    owner: &ModelSchema,
    member: &'a MemberDescriptor,
) -> Result<&'a TypeDescriptor, SchemaError> {
    match member.type_descriptor() {
        Some(ty) if member.kind().is_accessible() => Ok(ty),
        _ => Err(SchemaError::not_accessible(member.name(), owner.name())),
    }
}

/// Serializable overview of a model schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSummary {
    pub name: String,
    pub index_name: Option<String>,
    pub key: Option<String>,
    pub members: Vec<String>,
}

/// A builder for constructing model schemas in a fluent manner.
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    schema: ModelSchema,
}

impl ModelSchemaBuilder {
    /// Create a new builder for a model with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        ModelSchemaBuilder {
            schema: ModelSchema {
                name: name.into(),
                index_name: None,
                members: Vec::new(),
            },
        }
    }

    /// Set the index the model is stored in.
    pub fn index_name<S: Into<String>>(mut self, index_name: S) -> Self {
        self.schema.index_name = Some(index_name.into());
        self
    }

    /// Add a member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.schema.members.push(member);
        self
    }

    /// Add a property with search attributes.
    pub fn property<S: Into<String>>(
        self,
        name: S,
        ty: TypeDescriptor,
        attributes: SearchableProperty,
    ) -> Self {
        self.member(MemberDescriptor::property(name, ty).with_attributes(attributes))
    }

    /// Validate and build the schema.
    ///
    /// Fails when two members share a name or more than one property is a key.
    pub fn build(self) -> Result<ModelSchema, SchemaError> {
        let schema = self.schema;

        for (i, member) in schema.members.iter().enumerate() {
            if schema.members[..i].iter().any(|m| m.name() == member.name()) {
                return Err(SchemaError::DuplicateMember {
                    model: schema.name.clone(),
                    member: member.name().to_string(),
                });
            }
        }

        let mut keys = schema.members.iter().filter(|m| m.has_attribute(|a| a.is_key));
        if let (Some(first), Some(second)) = (keys.next(), keys.next()) {
            return Err(SchemaError::AmbiguousKey {
                model: schema.name.clone(),
                first: first.name().to_string(),
                second: second.name().to_string(),
            });
        }

        Ok(schema)
    }
}
