//! Position of a metadata object in the catalog tree.

/// Names identifying where a collection sits: catalog, schema, cube and so on.
///
/// Handlers read the context to fill in parent names, and collections derive
/// their restrictions from it. It holds names only, never references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub cube: Option<String>,
    pub dimension: Option<String>,
    pub hierarchy: Option<String>,
    pub level: Option<String>,
    pub measure_group: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(&self, catalog: impl Into<String>) -> Self {
        Self {
            catalog: Some(catalog.into()),
            ..self.clone()
        }
    }

    pub fn with_schema(&self, schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..self.clone()
        }
    }

    pub fn with_cube(&self, cube: impl Into<String>) -> Self {
        Self {
            cube: Some(cube.into()),
            ..self.clone()
        }
    }

    /// Scope to a dimension by unique name.
    pub fn with_dimension(&self, dimension: impl Into<String>) -> Self {
        Self {
            dimension: Some(dimension.into()),
            ..self.clone()
        }
    }

    /// Scope to a hierarchy by unique name.
    pub fn with_hierarchy(&self, hierarchy: impl Into<String>) -> Self {
        Self {
            hierarchy: Some(hierarchy.into()),
            ..self.clone()
        }
    }

    /// Scope to a level by unique name.
    pub fn with_level(&self, level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
            ..self.clone()
        }
    }

    pub fn with_measure_group(&self, measure_group: impl Into<String>) -> Self {
        Self {
            measure_group: Some(measure_group.into()),
            ..self.clone()
        }
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn cube(&self) -> Option<&str> {
        self.cube.as_deref()
    }

    pub fn dimension(&self) -> Option<&str> {
        self.dimension.as_deref()
    }

    pub fn hierarchy(&self) -> Option<&str> {
        self.hierarchy.as_deref()
    }

    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    pub fn measure_group(&self) -> Option<&str> {
        self.measure_group.as_deref()
    }
}
