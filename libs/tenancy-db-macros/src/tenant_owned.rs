use heck::ToUpperCamelCase;
use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, spanned::Spanned};

/// Configuration parsed from `#[tenant_owned(...)]` attributes
#[derive(Debug)]
struct TenantOwnedConfig {
    tenant_col: String,
    id_col: String,
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_tenant_owned(input: DeriveInput) -> TokenStream {
    let config = match parse_config(&input) {
        Ok(config) => config,
        Err(err) => abort!(err.span(), "{}", err),
    };

    let span = input.ident.span();
    let entity_ident = syn::Ident::new("Entity", span);
    let tenant_variant = syn::Ident::new(&config.tenant_col.to_upper_camel_case(), span);
    let id_variant = syn::Ident::new(&config.id_col.to_upper_camel_case(), span);

    quote! {
        impl ::tenancy_db::TenantOwned for #entity_ident {
            fn tenant_col() -> Self::Column {
                Self::Column::#tenant_variant
            }

            fn id_col() -> Self::Column {
                Self::Column::#id_variant
            }
        }
    }
}

fn parse_config(input: &DeriveInput) -> syn::Result<TenantOwnedConfig> {
    if !matches!(&input.data, Data::Struct(_)) {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(TenantOwned)] can only be applied to structs",
        ));
    }

    let mut tenant_col: Option<(String, Span)> = None;
    let mut id_col: Option<(String, Span)> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("tenant_owned") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            let slot = match key.as_str() {
                "tenant_col" => &mut tenant_col,
                "id_col" => &mut id_col,
                _ => {
                    return Err(syn::Error::new(
                        span,
                        format!("unknown attribute '{key}'. Valid attributes: tenant_col, id_col"),
                    ));
                }
            };

            if slot.is_some() {
                return Err(syn::Error::new(span, format!("duplicate attribute '{key}'")));
            }

            let lit: syn::LitStr = meta.value()?.parse()?;
            let value = lit.value();
            if !is_column_name(&value) {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("'{value}' is not a snake_case column name"),
                ));
            }
            *slot = Some((value, span));
            Ok(())
        })?;
    }

    let struct_span = input.span();
    let missing = |name: &str| {
        syn::Error::new(
            struct_span,
            format!("tenant_owned: missing `{name} = \"column_name\"`"),
        )
    };

    Ok(TenantOwnedConfig {
        tenant_col: tenant_col.ok_or_else(|| missing("tenant_col"))?.0,
        id_col: id_col.ok_or_else(|| missing("id_col"))?.0,
    })
}

fn is_column_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !s.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn parses_both_columns() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
            struct Model { id: u32, tenant_id: u32 }
        };
        let config = parse_config(&input).unwrap();
        assert_eq!(config.tenant_col, "tenant_id");
        assert_eq!(config.id_col, "id");
    }

    #[test]
    fn attributes_may_be_split() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(tenant_col = "owner_tenant")]
            #[tenant_owned(id_col = "order_id")]
            struct Model { order_id: u32, owner_tenant: u32 }
        };
        let config = parse_config(&input).unwrap();
        assert_eq!(config.tenant_col, "owner_tenant");
        assert_eq!(config.id_col, "order_id");
    }

    #[test]
    fn rejects_missing_tenant_col() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(id_col = "id")]
            struct Model { id: u32 }
        };
        let err = parse_config(&input).unwrap_err();
        assert!(err.to_string().contains("tenant_col"));
    }

    #[test]
    fn rejects_duplicate() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(tenant_col = "a", tenant_col = "b", id_col = "id")]
            struct Model;
        };
        let err = parse_config(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate attribute 'tenant_col'"));
    }

    #[test]
    fn rejects_unknown_key() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(owner_col = "x")]
            struct Model;
        };
        let err = parse_config(&input).unwrap_err();
        assert!(err.to_string().contains("unknown attribute 'owner_col'"));
    }

    #[test]
    fn rejects_enum() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
            enum Model { A }
        };
        assert!(parse_config(&input).is_err());
    }

    #[test]
    fn rejects_bad_column_name() {
        let input: DeriveInput = parse_quote! {
            #[tenant_owned(tenant_col = "Tenant-Id", id_col = "id")]
            struct Model;
        };
        let err = parse_config(&input).unwrap_err();
        assert!(err.to_string().contains("snake_case"));
    }

    #[test]
    fn column_variant_names() {
        assert_eq!("tenant_id".to_upper_camel_case(), "TenantId");
        assert_eq!("id".to_upper_camel_case(), "Id");
    }
}
