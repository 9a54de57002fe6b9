//! Member descriptors for model schemas.
//!
//! A model member is described by its [`MemberKind`], a [`TypeDescriptor`]
//! and, when it takes part in search, a set of [`SearchableProperty`]
//! attributes.

use serde::{Deserialize, Serialize};

use crate::schema::schema::{ModelSchema, SearchableModel};

/// Primitive value kind a property path resolves to.
///
/// The kind decides how literal values are encoded in native queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// 32-bit integer (also used for enum discriminants).
    Int,
    /// 64-bit integer.
    Long,
    /// Floating point number.
    Double,
    /// Boolean.
    Bool,
    /// Text.
    String,
    /// Point in time (UTC).
    DateTime,
    /// Single character.
    Char,
}

impl ValueKind {
    /// Whether values of this kind render as bare numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Long | ValueKind::Double)
    }

    /// Whether values of this kind render as quoted text.
    pub fn is_textual(self) -> bool {
        matches!(self, ValueKind::String | ValueKind::Char)
    }

    /// Get the name of this value kind.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::DateTime => "datetime",
            ValueKind::Char => "char",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a model member.
#[derive(Clone)]
pub enum TypeDescriptor {
    /// A primitive value.
    Primitive(ValueKind),
    /// An enumeration, searched by its integer discriminant.
    Enum(&'static str),
    /// An optional wrapper around another type.
    Nullable(Box<TypeDescriptor>),
    /// A list of another type.
    List(Box<TypeDescriptor>),
    /// A nested object described by its own schema.
    Object(fn() -> &'static ModelSchema),
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            TypeDescriptor::Enum(name) => f.debug_tuple("Enum").field(name).finish(),
            TypeDescriptor::Nullable(inner) => f.debug_tuple("Nullable").field(inner).finish(),
            TypeDescriptor::List(inner) => f.debug_tuple("List").field(inner).finish(),
            TypeDescriptor::Object(schema) => f
                .debug_tuple("Object")
                .field(&format!("<{}>", schema().name()))
                .finish(),
        }
    }
}

impl TypeDescriptor {
    pub fn int() -> Self {
        TypeDescriptor::Primitive(ValueKind::Int)
    }

    pub fn long() -> Self {
        TypeDescriptor::Primitive(ValueKind::Long)
    }

    pub fn double() -> Self {
        TypeDescriptor::Primitive(ValueKind::Double)
    }

    pub fn bool() -> Self {
        TypeDescriptor::Primitive(ValueKind::Bool)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(ValueKind::String)
    }

    pub fn datetime() -> Self {
        TypeDescriptor::Primitive(ValueKind::DateTime)
    }

    pub fn char() -> Self {
        TypeDescriptor::Primitive(ValueKind::Char)
    }

    /// An enumeration type with the given name.
    pub fn enumeration(name: &'static str) -> Self {
        TypeDescriptor::Enum(name)
    }

    /// Wrap a type as optional.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Nullable(Box::new(inner))
    }

    /// Wrap a type as a list.
    pub fn list(inner: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(inner))
    }

    /// A nested object of a searchable model type.
    pub fn object<T: SearchableModel>() -> Self {
        TypeDescriptor::Object(T::schema)
    }

    /// Strip nullable and list wrappers, outermost first.
    ///
    /// `Nullable(List(T))` and `List(Nullable(T))` both end on `T`, each wrapper
    /// being removed in the order it encloses the next one.
    pub fn unwrapped(&self) -> &TypeDescriptor {
        let mut current = self;
        loop {
            match current {
                TypeDescriptor::Nullable(inner) | TypeDescriptor::List(inner) => current = inner,
                _ => return current,
            }
        }
    }

    /// Whether the outermost wrapper is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeDescriptor::Nullable(_))
    }

    /// Value kind of the unwrapped type, if it is a value at all.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self.unwrapped() {
            TypeDescriptor::Primitive(kind) => Some(*kind),
            TypeDescriptor::Enum(_) => Some(ValueKind::Int),
            _ => None,
        }
    }

    /// Nested schema of the unwrapped type, if it is an object.
    pub fn object_schema(&self) -> Option<&'static ModelSchema> {
        match self.unwrapped() {
            TypeDescriptor::Object(schema) => Some(schema()),
            _ => None,
        }
    }
}

/// Kind of a model member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    Event,
}

impl MemberKind {
    /// Whether members of this kind hold a value that can be searched.
    pub fn is_accessible(self) -> bool {
        matches!(self, MemberKind::Field | MemberKind::Property)
    }
}

/// Search attributes attached to a model property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchableProperty {
    pub is_key: bool,
    pub is_searchable: bool,
    pub synonym_maps: Vec<String>,
    /// Boost applied to the property in free-text queries; `0` means none.
    pub searchable_boost: f64,
    pub is_filterable: bool,
    pub is_sortable: bool,
    pub is_facetable: bool,
    /// The property is stored as a nested sub-document.
    pub is_nested: bool,
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub index_analyzer: Option<String>,
    pub use_for_suggestions: bool,
    /// Range boundaries for range facets.
    pub facetable_ranges: Vec<f64>,
}

impl SearchableProperty {
    /// Create a property with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether this is the model's key property.
    pub fn key(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Set whether the property takes part in free-text search.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.is_searchable = searchable;
        self
    }

    /// Set the free-text boost.
    pub fn with_boost(mut self, boost: f64) -> Self {
        self.searchable_boost = boost;
        self
    }

    /// Set whether the property can be filtered on.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.is_filterable = filterable;
        self
    }

    /// Set whether the property can be sorted on.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.is_sortable = sortable;
        self
    }

    /// Set whether the property can be faceted on.
    pub fn facetable(mut self, facetable: bool) -> Self {
        self.is_facetable = facetable;
        self
    }

    /// Set whether the property is a nested sub-document.
    pub fn nested(mut self, nested: bool) -> Self {
        self.is_nested = nested;
        self
    }

    /// Set the analyzer used for both indexing and searching.
    pub fn with_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Set the search-time analyzer.
    pub fn with_search_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.search_analyzer = Some(analyzer.into());
        self
    }

    /// Set the index-time analyzer.
    pub fn with_index_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.index_analyzer = Some(analyzer.into());
        self
    }

    /// Add a synonym map.
    pub fn with_synonym_map<S: Into<String>>(mut self, name: S) -> Self {
        self.synonym_maps.push(name.into());
        self
    }

    /// Set whether the property feeds suggesters.
    pub fn suggestions(mut self, use_for_suggestions: bool) -> Self {
        self.use_for_suggestions = use_for_suggestions;
        self
    }

    /// Set the range facet boundaries.
    pub fn with_facetable_ranges<I: IntoIterator<Item = f64>>(mut self, ranges: I) -> Self {
        self.facetable_ranges = ranges.into_iter().collect();
        self
    }
}

/// A member of a model schema.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    kind: MemberKind,
    /// Declared type; absent for methods, constructors and events.
    ty: Option<TypeDescriptor>,
    attributes: Option<SearchableProperty>,
    ignored: bool,
}

impl MemberDescriptor {
    fn new<S: Into<String>>(name: S, kind: MemberKind, ty: Option<TypeDescriptor>) -> Self {
        MemberDescriptor {
            name: name.into(),
            kind,
            ty,
            attributes: None,
            ignored: false,
        }
    }

    /// A property member.
    pub fn property<S: Into<String>>(name: S, ty: TypeDescriptor) -> Self {
        Self::new(name, MemberKind::Property, Some(ty))
    }

    /// A plain field member.
    pub fn field<S: Into<String>>(name: S, ty: TypeDescriptor) -> Self {
        Self::new(name, MemberKind::Field, Some(ty))
    }

    /// A method member.
    pub fn method<S: Into<String>>(name: S) -> Self {
        Self::new(name, MemberKind::Method, None)
    }

    /// A constructor member.
    pub fn constructor<S: Into<String>>(name: S) -> Self {
        Self::new(name, MemberKind::Constructor, None)
    }

    /// An event member.
    pub fn event<S: Into<String>>(name: S) -> Self {
        Self::new(name, MemberKind::Event, None)
    }

    /// Attach search attributes.
    pub fn with_attributes(mut self, attributes: SearchableProperty) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Exclude the member from selected fields.
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        self.ty.as_ref()
    }

    pub fn attributes(&self) -> Option<&SearchableProperty> {
        self.attributes.as_ref()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether the member is a field or property that is not ignored.
    pub fn is_selectable(&self) -> bool {
        self.kind.is_accessible() && !self.ignored
    }

    /// Whether the member carries attributes with the given flag set.
    pub fn has_attribute(&self, flag: impl Fn(&SearchableProperty) -> bool) -> bool {
        self.attributes.as_ref().is_some_and(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrapped_peels_all_wrappers() {
        let ty = TypeDescriptor::nullable(TypeDescriptor::list(TypeDescriptor::int()));
        assert_eq!(ty.value_kind(), Some(ValueKind::Int));
        assert!(ty.is_nullable());

        let ty = TypeDescriptor::list(TypeDescriptor::nullable(TypeDescriptor::string()));
        assert_eq!(ty.value_kind(), Some(ValueKind::String));
        assert!(!ty.is_nullable());
    }

    #[test]
    fn test_enum_resolves_to_int() {
        let ty = TypeDescriptor::nullable(TypeDescriptor::enumeration("Status"));
        assert_eq!(ty.value_kind(), Some(ValueKind::Int));
        assert!(ty.object_schema().is_none());
    }

    #[test]
    fn test_value_kind_classes() {
        assert!(ValueKind::Long.is_numeric());
        assert!(!ValueKind::Bool.is_numeric());
        assert!(ValueKind::Char.is_textual());
        assert_eq!(ValueKind::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_searchable_property_builder() {
        let attrs = SearchableProperty::new()
            .searchable(true)
            .with_boost(2.0)
            .facetable(true)
            .with_facetable_ranges([10.0, 20.0])
            .with_analyzer("en.microsoft");

        assert!(attrs.is_searchable);
        assert!(attrs.is_facetable);
        assert!(!attrs.is_key);
        assert_eq!(attrs.searchable_boost, 2.0);
        assert_eq!(attrs.facetable_ranges, vec![10.0, 20.0]);
        assert_eq!(attrs.analyzer.as_deref(), Some("en.microsoft"));
    }

    #[test]
    fn test_member_descriptor() {
        let member = MemberDescriptor::property("Name", TypeDescriptor::string())
            .with_attributes(SearchableProperty::new().searchable(true));
        assert!(member.is_selectable());
        assert!(member.has_attribute(|a| a.is_searchable));
        assert!(!member.has_attribute(|a| a.is_facetable));

        let method = MemberDescriptor::method("ToString");
        assert_eq!(method.kind(), MemberKind::Method);
        assert!(!method.is_selectable());
        assert!(method.type_descriptor().is_none());

        let ignored = MemberDescriptor::field("Cache", TypeDescriptor::string()).ignored(true);
        assert!(!ignored.is_selectable());
    }
}
