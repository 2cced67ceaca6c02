//! Tenant path rewriting

use candle_shared::TenantConfig;

/// Prefix a path (with optional query) with the tenant id
///
/// `/termos?v=2` for tenant `acme` becomes `/acme/termos?v=2`. Without a
/// tenant the path is returned unchanged. Applied once per request; feeding
/// an already rewritten path back in prefixes it again.
pub fn rewrite(path: &str, tenant: Option<&TenantConfig>) -> String {
    match tenant {
        Some(tenant) => format!("/{}{}", tenant.id, path),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_shared::TenantId;

    #[test]
    fn test_rewrite_with_tenant() {
        let tenant = TenantConfig::default_tenant();
        assert_eq!(rewrite("/termos", Some(&tenant)), "/candle/termos");
        assert_eq!(rewrite("/", Some(&tenant)), "/candle/");
        assert_eq!(
            rewrite("/consultas/cpf?doc=123", Some(&tenant)),
            "/candle/consultas/cpf?doc=123"
        );
    }

    #[test]
    fn test_rewrite_without_tenant() {
        assert_eq!(rewrite("/termos", None), "/termos");
        assert_eq!(rewrite("/dashboard?tab=1", None), "/dashboard?tab=1");
    }

    #[test]
    fn test_rewrite_uses_tenant_id_not_domain() {
        let tenant = TenantConfig {
            id: TenantId::from("acme"),
            domain: "consulta.acme.com.br".to_string(),
            ..TenantConfig::default_tenant()
        };
        assert_eq!(rewrite("/login", Some(&tenant)), "/acme/login");
    }
}
