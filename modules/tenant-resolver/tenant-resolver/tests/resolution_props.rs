#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use proptest::prelude::*;
use tenant_resolver::{
    CallerIdentity, RequestMeta, ResolutionError, TenantResolverConfig, TenantResolverModule,
};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn recase(s: &str, mask: &[bool]) -> String {
    s.chars()
        .zip(mask.iter().cycle())
        .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
        .collect()
}

fn meta() -> RequestMeta {
    RequestMeta {
        method: "GET".to_owned(),
        path: "/notes".to_owned(),
        correlation_id: "prop".to_owned(),
        ..Default::default()
    }
}

async fn module_with(slugs: &[&str]) -> (TenantResolverModule, Vec<tenant_resolver::TenantRecord>) {
    let db = common::database().await;
    let module = TenantResolverModule::with_database(db, &TenantResolverConfig::default()).unwrap();
    let mut records = Vec::new();
    for slug in slugs {
        records.push(common::register(&module, slug, slug).await);
    }
    (module, records)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_casing_resolves_to_the_same_tenant(
        slug in "shop-[a-z0-9]{1,20}",
        mask in prop::collection::vec(any::<bool>(), 1..6),
        pad in "[ \t]{0,2}",
    ) {
        runtime().block_on(async {
            let (module, records) = module_with(&[slug.as_str()]).await;
            let claimed = format!("{pad}{}{pad}", recase(&slug, &mask));
            let ctx = module
                .service()
                .resolve(Some(&claimed), None, &meta())
                .await
                .unwrap();
            assert_eq!(ctx.tenant_id(), records[0].id);
            assert_eq!(ctx.slug(), slug);
        });
    }

    #[test]
    fn callers_never_reach_another_tenant(
        by_id in any::<bool>(),
        mask in prop::collection::vec(any::<bool>(), 1..6),
        target_own in any::<bool>(),
    ) {
        runtime().block_on(async {
            let (module, records) = module_with(&["tenant-alpha", "tenant-beta"]).await;
            let own = &records[0];
            let affiliation = if by_id {
                recase(&own.id.to_string(), &mask)
            } else {
                recase(&own.slug, &mask)
            };
            let caller = CallerIdentity {
                id: "user-9".to_owned(),
                email: None,
                tenant: affiliation,
            };
            let target = if target_own { "TENANT-ALPHA" } else { "tenant-beta" };

            let res = module
                .service()
                .resolve(Some(target), Some(&caller), &meta())
                .await;
            if target_own {
                assert_eq!(res.unwrap().tenant_id(), own.id);
            } else {
                assert_eq!(res, Err(ResolutionError::CrossTenantAccess));
            }
        });
    }
}
