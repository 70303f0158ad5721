use uuid::Uuid;

/// Identity of the tenant an operation runs for.
///
/// A plain value: cloning it never shares mutable state between operations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TenantContext {
    tenant_id: Uuid,
    slug: String,
    name: String,
}

impl TenantContext {
    /// Create a new `TenantContext` builder
    #[must_use]
    pub fn builder() -> TenantContextBuilder {
        TenantContextBuilder::default()
    }

    #[must_use]
    pub fn new(tenant_id: Uuid, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant_id,
            slug: slug.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A context is usable when it identifies a tenant by id or by slug.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.tenant_id.is_nil() || !self.slug.trim().is_empty()
    }
}

#[derive(Default)]
pub struct TenantContextBuilder {
    tenant_id: Option<Uuid>,
    slug: Option<String>,
    name: Option<String>,
}

impl TenantContextBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_owned());
        self
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn build(self) -> TenantContext {
        TenantContext {
            tenant_id: self.tenant_id.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        }
    }
}
